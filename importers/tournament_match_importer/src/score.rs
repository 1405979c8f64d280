/// Best-of-five: set 1 through set 5.
pub const MAX_SETS: usize = 5;

/// Raw per-set scores in play order, e.g. `["25-20", "23-25"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetScoreSet {
    sets: Vec<String>,
}

/// Sets won per side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateScore {
    pub side_a: i32,
    pub side_b: i32,
}

impl SetScoreSet {
    pub fn sets(&self) -> &[String] {
        &self.sets
    }

    /// Raw score of set `index` (0-based), `None` if it was not played.
    pub fn set(&self, index: usize) -> Option<&str> {
        self.sets.get(index).map(String::as_str)
    }

    /// Fixed-width view for storage: `MAX_SETS` entries, empty where absent.
    pub fn slots(&self) -> Vec<String> {
        (0..MAX_SETS)
            .map(|index| self.set(index).unwrap_or_default().to_string())
            .collect()
    }
}

/// Splits a comma-separated score list. Entries are not validated here.
pub fn parse_set_scores(raw: &str) -> SetScoreSet {
    SetScoreSet {
        sets: raw
            .split(',')
            .map(str::trim)
            .filter(|set| !set.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Counts sets won by each side. Malformed sets and ties count for nobody,
/// so this never fails.
pub fn aggregate(sets: &SetScoreSet) -> AggregateScore {
    let mut score = AggregateScore::default();
    for (a, b) in sets.sets.iter().filter_map(|set| parse_set(set)) {
        if a > b {
            score.side_a += 1;
        } else if b > a {
            score.side_b += 1;
        }
    }
    score
}

fn parse_set(set: &str) -> Option<(i32, i32)> {
    let parts: Vec<&str> = set.split('-').collect();
    if parts.len() != 2 {
        return None;
    }
    let a = parts[0].trim().parse::<i32>().ok()?;
    let b = parts[1].trim().parse::<i32>().ok()?;
    Some((a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(raw: &str) -> (i32, i32) {
        let score = aggregate(&parse_set_scores(raw));
        (score.side_a, score.side_b)
    }

    #[test]
    fn test_aggregate_known_scores() {
        assert_eq!(tally(""), (0, 0));
        assert_eq!(tally("25-20"), (1, 0));
        assert_eq!(tally("20-25,25-20"), (1, 1));
        assert_eq!(tally("25-25"), (0, 0));
        assert_eq!(tally("abc-20"), (0, 0));
    }

    #[test]
    fn test_full_five_setter() {
        assert_eq!(tally("25-23, 22-25 ,25-18,19-25,15-13"), (3, 2));
    }

    #[test]
    fn test_malformed_sets_are_ignored() {
        // Too many parts, a negative half and a missing half.
        assert_eq!(tally("25-20-3,25--3,25-,21-25"), (0, 1));
    }

    #[test]
    fn test_aggregate_never_exceeds_segment_count() {
        for raw in ["25-20,25-21,25-22", "1-0,0-1,5-5,x-y", "30-28"] {
            let segments = raw.split(',').count() as i32;
            let (a, b) = tally(raw);
            assert!(a + b <= segments, "{} produced {}-{}", raw, a, b);
        }
    }

    #[test]
    fn test_parse_drops_empty_entries() {
        let sets = parse_set_scores("25-20,, 18-25 ,");
        assert_eq!(sets.sets(), &["25-20".to_string(), "18-25".to_string()]);
        assert_eq!(sets.set(1), Some("18-25"));
        assert_eq!(sets.set(2), None);
    }

    #[test]
    fn test_slots_are_padded_to_five_sets() {
        let slots = parse_set_scores("25-20,18-25").slots();
        assert_eq!(slots, vec!["25-20", "18-25", "", "", ""]);
        assert_eq!(parse_set_scores("").slots().len(), MAX_SETS);
    }
}
