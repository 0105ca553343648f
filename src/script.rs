//! The two scripted timelines: the opening briefing and the collapse.

use crate::entities::EntityKind;
use crate::error::GameResult;
use crate::media::Media;
use crate::sequencer::{Action, EndScreen, Speaker};

/// Briefing over a black screen, logo sting, then gameplay with a first
/// troll placed in the car's path before the waves begin.
pub fn opening(media: &mut dyn Media) -> GameResult<Vec<Action>> {
    Ok(vec![
        Action::delay(1.0),
        Action::speak(
            media,
            Speaker::Dispatcher,
            "voice/intro1.flac",
            "All units, we have a situation on the information superhighway.",
        )?,
        Action::speak(
            media,
            Speaker::Officer,
            "voice/intro2.flac",
            "Copy that, dispatch. What are we looking at?",
        )?,
        Action::speak(
            media,
            Speaker::Dispatcher,
            "voice/intro3.flac",
            "Trolls. Dozens of them, flooding the net with fake news.",
        )?,
        Action::ShowLogo,
        Action::delay(2.5),
        Action::HideLogo,
        Action::StartGameplay,
        Action::delay(1.0),
        Action::speak(
            media,
            Speaker::Dispatcher,
            "voice/intro4.flac",
            "Ban the trolls, shoot down their fakes. Leave regular users alone!",
        )?,
        Action::SpawnSingle {
            kind: EntityKind::Enemy,
            ahead: 150.0,
        },
        Action::delay(4.0),
        Action::SpawnWave,
        Action::speak(
            media,
            Speaker::Officer,
            "voice/intro5.flac",
            "If that fake-o-meter tops out, the whole net goes down with it.",
        )?,
    ])
}

/// Queued after the fake-counter overflows.
pub fn ending(media: &mut dyn Media) -> GameResult<Vec<Action>> {
    Ok(vec![
        Action::delay(1.5),
        Action::SwitchEndScreen(EndScreen::Blackout),
        Action::speak(
            media,
            Speaker::Narrator,
            "voice/outro1.flac",
            "The fakes spread faster than anyone could check them.",
        )?,
        Action::SwitchEndScreen(EndScreen::Flood),
        Action::speak(
            media,
            Speaker::Narrator,
            "voice/outro2.flac",
            "By morning, nobody could tell what was true anymore.",
        )?,
        Action::SwitchEndScreen(EndScreen::Silence),
        Action::RevealScore,
    ])
}
