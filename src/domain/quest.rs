/// Main quest ("rescue the kid") and the dialogue that drives it.
///
/// Dialogue is a pure lookup from (speaker, quest state, what the player
/// carries) to a line plus a list of world effects. Effects are applied
/// separately, and only an `Advance` effect touches the quest state, always
/// by exactly one step forward.

use super::item::{ItemId, ItemManager};
use super::npc::{NpcManager, PersonId, PersonMove};

/// How close the kid must stand to the old man to count as returned.
pub const RETURN_RANGE: f64 = 144.0;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum QuestState {
    Start,
    Blacksmith,
    OldMan,
    FindKid,
    KidFound,
    Done,
}

impl QuestState {
    pub const ALL: [QuestState; 6] = [
        QuestState::Start, QuestState::Blacksmith, QuestState::OldMan,
        QuestState::FindKid, QuestState::KidFound, QuestState::Done,
    ];

    /// The following state. `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            QuestState::Start => QuestState::Blacksmith,
            QuestState::Blacksmith => QuestState::OldMan,
            QuestState::OldMan => QuestState::FindKid,
            QuestState::FindKid => QuestState::KidFound,
            QuestState::KidFound | QuestState::Done => QuestState::Done,
        }
    }

    /// One-line objective for the HUD.
    pub fn objective(self) -> &'static str {
        match self {
            QuestState::Start => "Talk to the old man in the glade",
            QuestState::Blacksmith => "Ask the blacksmith for help",
            QuestState::OldMan => "Show the old man your sword",
            QuestState::FindKid => "Find the kid in the hedge maze",
            QuestState::KidFound => "Bring the kid back to the old man",
            QuestState::Done => "The kid is safe",
        }
    }
}

/// What the speaker can see when spoken to.
#[derive(Clone, Copy, Debug)]
pub struct TalkContext {
    pub quest: QuestState,
    /// Speaker's world position, for items handed over.
    pub speaker: (i32, i32),
    pub has_axe: bool,
    pub has_coins: bool,
    pub kid_nearby: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Effect {
    SetMovement(PersonId, PersonMove),
    PlaceItem(ItemId, i32, i32),
    ConsumeItem(ItemId),
    Advance,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Reply {
    pub line: &'static str,
    pub effects: Vec<Effect>,
}

impl Reply {
    fn line(line: &'static str) -> Self {
        Reply { line, effects: Vec::new() }
    }

    fn with(line: &'static str, effects: Vec<Effect>) -> Self {
        Reply { line, effects }
    }
}

/// Look up what `who` says.
pub fn talk(who: PersonId, ctx: &TalkContext) -> Reply {
    use QuestState::*;
    let (sx, sy) = ctx.speaker;

    match (who, ctx.quest) {
        (PersonId::OldMan, Start) => Reply::with(
            "My grandson ran into the hedge maze! The blacksmith may help.",
            vec![Effect::Advance],
        ),
        (PersonId::OldMan, Blacksmith) => Reply::line("Please hurry to the blacksmith."),
        (PersonId::OldMan, OldMan) => Reply::with(
            "A fine sword. Take my key to the maze gate and find him.",
            vec![Effect::PlaceItem(ItemId::Key, sx, sy + 40), Effect::Advance],
        ),
        (PersonId::OldMan, FindKid) => Reply::line("The maze is east of here. Hurry!"),
        (PersonId::OldMan, KidFound) if ctx.kid_nearby => Reply::with(
            "You found him! Thank you, hero.",
            vec![Effect::SetMovement(PersonId::Kid, PersonMove::Wander), Effect::Advance],
        ),
        (PersonId::OldMan, KidFound) => Reply::line("Where is the boy? Bring him to me."),
        (PersonId::OldMan, Done) => Reply::line("We owe you everything."),

        (PersonId::Blacksmith, Blacksmith) if ctx.has_axe => Reply::with(
            "My old axe! Take this sword, you'll need it in there.",
            vec![
                Effect::ConsumeItem(ItemId::Axe),
                Effect::PlaceItem(ItemId::Sword, sx + 40, sy),
                Effect::Advance,
            ],
        ),
        (PersonId::Blacksmith, Blacksmith) => {
            Reply::line("Orcs in the maze? Fetch my axe from the pen behind the fires.")
        }
        (PersonId::Blacksmith, Start) => Reply::line("Busy day at the forge."),
        (PersonId::Blacksmith, Done) => Reply::line("Keep that blade sharp."),
        (PersonId::Blacksmith, _) => Reply::line("Go on, the old man is waiting."),

        (PersonId::Kid, FindKid) => Reply::with(
            "Grandpa sent you? Let's go home!",
            vec![Effect::SetMovement(PersonId::Kid, PersonMove::Follow), Effect::Advance],
        ),
        (PersonId::Kid, KidFound) => Reply::line("Lead the way!"),
        (PersonId::Kid, Done) => Reply::line("Thanks for finding me!"),
        (PersonId::Kid, _) => Reply::line("I'm lost..."),

        (PersonId::Lady, Start | Blacksmith) => {
            Reply::line("The old man looks worried. Go and see him.")
        }
        (PersonId::Lady, Done) => Reply::line("Everyone's talking about you!"),
        (PersonId::Lady, _) => Reply::line("There's water in the glade pond."),

        (PersonId::Sailor, _) if ctx.has_coins => {
            Reply::line("Gold? Step onto the gangplank, we sail for the island.")
        }
        (PersonId::Sailor, _) => Reply::line("Passage to the island costs gold coins."),
    }
}

/// Carry out a reply's effects. Returns the new quest state when it moved.
pub fn apply(
    effects: &[Effect],
    quest: &mut QuestState,
    npcs: &mut NpcManager,
    items: &mut ItemManager,
) -> Option<QuestState> {
    let mut advanced = None;
    for effect in effects {
        match *effect {
            Effect::SetMovement(id, movement) => npcs.set_person_movement(id, movement),
            Effect::PlaceItem(id, x, y) => items.place(id, x, y),
            Effect::ConsumeItem(id) => items.remove(id),
            Effect::Advance => {
                *quest = quest.next();
                advanced = Some(*quest);
            }
        }
    }
    advanced
}
