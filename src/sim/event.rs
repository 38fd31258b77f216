/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound.

use crate::domain::item::ItemId;
use crate::domain::npc::{MonsterId, PersonId};
use crate::domain::quest::QuestState;
use crate::domain::tile::Teleport;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PickedUp(ItemId),
    Dropped(ItemId),
    BucketFilled,
    Splash { doused: usize },
    Chopped { trees: usize },
    Unlocked { doors: usize },
    Swing,
    MonsterHit(MonsterId),
    MonsterKilled(MonsterId),
    PlayerHurt { health: i32 },
    KnockedOut,
    Talked(PersonId),
    QuestAdvanced(QuestState),
    Teleported(Teleport),
    PassageRefused,
    ScrollStarted,
}
