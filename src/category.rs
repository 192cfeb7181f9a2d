use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    Score,
    Position { count: usize },
    Chess,
    PlaneRace,
}

impl CategoryKind {
    /// Number of finisher slots a section of this kind carries; zero for score-kind.
    pub fn position_count(self) -> usize {
        match self {
            CategoryKind::Score => 0,
            CategoryKind::Position { count } => count,
            CategoryKind::Chess => 2,
            CategoryKind::PlaneRace => 3,
        }
    }

    pub fn is_score(self) -> bool {
        matches!(self, CategoryKind::Score)
    }

    pub fn uses_positions(self) -> bool {
        !self.is_score()
    }

    // Only athletics events are split by gender.
    pub fn uses_gender(self) -> bool {
        matches!(self, CategoryKind::Position { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: CategoryKind,
}

pub const CATEGORIES: &[Category] = &[
    Category {
        key: "futbol",
        label: "Fútbol",
        kind: CategoryKind::Score,
    },
    Category {
        key: "beisbol5",
        label: "Béisbol 5",
        kind: CategoryKind::Score,
    },
    Category {
        key: "basketball",
        label: "Basketball",
        kind: CategoryKind::Score,
    },
    Category {
        key: "futenis",
        label: "Futénis",
        kind: CategoryKind::Score,
    },
    Category {
        key: "atletismo_velocidad",
        label: "Atletismo-Velocidad",
        kind: CategoryKind::Position { count: 4 },
    },
    Category {
        key: "atletismo_maraton",
        label: "Atletismo-Maratón",
        kind: CategoryKind::Position { count: 8 },
    },
    Category {
        key: "atletismo_relevo",
        label: "Atletismo-Relevo",
        kind: CategoryKind::Position { count: 3 },
    },
    Category {
        key: "vuelo_avion",
        label: "Vuelo de Avión",
        kind: CategoryKind::PlaneRace,
    },
    Category {
        key: "voleibol",
        label: "Voleibol",
        kind: CategoryKind::Score,
    },
    Category {
        key: "kickingball",
        label: "Kickingball",
        kind: CategoryKind::Score,
    },
    Category {
        key: "balonmano",
        label: "Balonmano",
        kind: CategoryKind::Score,
    },
    Category {
        key: "ajedrez",
        label: "Ajedrez",
        kind: CategoryKind::Chess,
    },
];

pub fn find_category(key: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Unknown keys behave like team sports.
pub fn kind_for_key(key: &str) -> CategoryKind {
    find_category(key)
        .map(|c| c.kind)
        .unwrap_or(CategoryKind::Score)
}

pub fn category_label(key: &str) -> &str {
    find_category(key).map(|c| c.label).unwrap_or(key)
}

pub fn catalog_index(key: &str) -> usize {
    CATEGORIES
        .iter()
        .position(|c| c.key == key)
        .unwrap_or(CATEGORIES.len())
}

pub fn search_categories(query: &str) -> Vec<&'static Category> {
    let needle = fold_accents(query.trim());
    if needle.is_empty() {
        return CATEGORIES.iter().collect();
    }
    CATEGORIES
        .iter()
        .filter(|c| fold_accents(c.label).contains(&needle) || c.key.contains(&needle))
        .collect()
}

fn fold_accents(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' | 'ü' | 'Ü' => 'u',
            'ñ' | 'Ñ' => 'n',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::fold_accents;

    #[test]
    fn fold_accents_strips_spanish_marks() {
        assert_eq!(fold_accents("Atletismo-Maratón"), "atletismo-maraton");
        assert_eq!(fold_accents("BÉISBOL"), "beisbol");
    }
}
