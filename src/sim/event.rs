/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CoinCollected { score: u32 },
    Jumped,
    LevelAdvanced { level: usize },
    CommentShown,
    PlayerHit,
    RouteCompleted,
    NewBest { score: u32 },
    ReturnedHome,
}
