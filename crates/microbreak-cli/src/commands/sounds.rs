use microbreak_core::{SoundKind, SOUNDS};
use serde::Serialize;

#[derive(Serialize)]
struct SoundEntry {
    id: &'static str,
    file: &'static str,
    kind: &'static str,
    label: &'static str,
}

fn kind_name(kind: SoundKind) -> &'static str {
    match kind {
        SoundKind::ShortBreak => "short_break",
        SoundKind::End => "end",
    }
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let entries: Vec<SoundEntry> = SOUNDS
            .iter()
            .map(|sound| SoundEntry {
                id: sound.id,
                file: sound.file,
                kind: kind_name(sound.kind),
                label: sound.label,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for sound in SOUNDS {
        println!(
            "{:<18} {:<12} {:<17} {}",
            sound.id,
            kind_name(sound.kind),
            sound.file,
            sound.label
        );
    }
    Ok(())
}
