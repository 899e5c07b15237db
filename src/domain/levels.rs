/// The route: four fixed Kuala Lumpur stages.
///
/// A level is purely cosmetic plus spawn pacing. Progress through the table
/// is driven by the coin quota in `sim::step`.

/// Which themed backdrop the renderer paints behind the field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Backdrop {
    Petronas,
    Batu,
    Merdeka,
    Bukit,
}

#[derive(Clone, Debug)]
pub struct Level {
    pub name: &'static str,
    pub backdrop: Backdrop,
    pub comment: &'static str,
    pub coin_interval_ms: u32,
    pub rug_interval_ms: u32,
}

pub const LEVELS: [Level; 4] = [
    Level {
        name: "Petronas Twin Towers",
        backdrop: Backdrop::Petronas,
        comment: "Welcome to the best route 🌍",
        coin_interval_ms: 900,
        rug_interval_ms: 1800,
    },
    Level {
        name: "Batu Caves",
        backdrop: Backdrop::Batu,
        comment: "Low slippage beats high gas ⛽",
        coin_interval_ms: 850,
        rug_interval_ms: 1650,
    },
    Level {
        name: "Merdeka Square",
        backdrop: Backdrop::Merdeka,
        comment: "Freedom = permissionless finance",
        coin_interval_ms: 800,
        rug_interval_ms: 1500,
    },
    Level {
        name: "Bukit Bintang",
        backdrop: Backdrop::Bukit,
        comment: "Speed wins the route ⚡",
        coin_interval_ms: 750,
        rug_interval_ms: 1350,
    },
];

pub const LEVEL_COUNT: usize = LEVELS.len();

/// Shown on the first coin of every level.
pub const FIRST_COIN_COMMENT: &str = "Jupiter finds the best route 🪐";

pub fn level(index: usize) -> Option<&'static Level> {
    LEVELS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_has_four_distinct_stages() {
        assert_eq!(LEVEL_COUNT, 4);
        let names: Vec<_> = LEVELS.iter().map(|l| l.name).collect();
        assert_eq!(names, ["Petronas Twin Towers", "Batu Caves", "Merdeka Square", "Bukit Bintang"]);
    }

    #[test]
    fn pacing_never_gets_easier() {
        for pair in LEVELS.windows(2) {
            assert!(pair[1].coin_interval_ms <= pair[0].coin_interval_ms);
            assert!(pair[1].rug_interval_ms <= pair[0].rug_interval_ms);
        }
        assert_eq!(LEVELS[0].coin_interval_ms, 900);
        assert_eq!(LEVELS[0].rug_interval_ms, 1800);
    }

    #[test]
    fn lookup_past_the_end_is_none() {
        assert!(level(3).is_some());
        assert!(level(4).is_none());
    }
}
