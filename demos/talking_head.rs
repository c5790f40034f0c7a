//! Talking-head demo: drives the engine with synthetic 60 Hz frames over
//! the built-in demo utterance (or a speech-track JSON file passed as the
//! first argument) and prints a few influence channels as they animate.
//!
//! ```sh
//! cargo run --example talking_head [track.json]
//! ```

use std::collections::HashMap;

use anyhow::{Context, Result};
use avatar_engine::{
    demo_timeline, AvatarMode, AvatarState, Compositor, EngineConfig, InfluenceSink, MeshId,
    SpeechSession, SpeechTrack, VisemeShapeTable, DEMO_DURATION,
};

/// One fake mesh; slot index → current influence.
#[derive(Default)]
struct DemoMesh {
    influences: HashMap<usize, f32>,
}

impl InfluenceSink for DemoMesh {
    fn set_influence(&mut self, _mesh: MeshId, slot: usize, value: f32) {
        self.influences.insert(slot, value);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let track = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading speech track {path}"))?;
            SpeechTrack::from_json(&json).context("parsing speech track")?
        }
        None => SpeechTrack {
            timeline: demo_timeline(),
            ..SpeechTrack::default()
        },
    };
    let duration = track
        .timeline
        .iter()
        .map(|segment| segment.end)
        .fold(DEMO_DURATION, f64::max);

    let mut compositor = Compositor::new(EngineConfig::default());

    // Pretend the asset loader discovered every CC4 shape plus the idle and
    // expression channels on a single mesh.
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut names: Vec<String> = VisemeShapeTable::cc4()
        .shape_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    names.extend(
        [
            "Eye_Blink_L",
            "Eye_Blink_R",
            "Brow_Raise_L",
            "Brow_Raise_R",
            "Mouth_Smile_L",
            "Mouth_Smile_R",
        ]
        .map(String::from),
    );
    names.sort();
    names.dedup();
    for (slot, name) in names.iter().enumerate() {
        compositor.registry_mut().register(name, 0, slot);
        slots.insert(name.clone(), slot);
    }

    let mut mesh = DemoMesh::default();
    let mut state = AvatarState::new();
    state.speak(&track, SpeechSession::demo(duration));

    println!("{:>6}  {:>7}  {:>8}  {:>11}  {:>11}", "time", "V_Open", "Jaw_Open", "Mouth_Close", "Eye_Blink_L");

    let delta = 1.0 / 60.0f32;
    let mut frame = 0usize;
    loop {
        compositor.tick(delta, &mut state, &mut mesh);
        frame += 1;

        if frame % 6 == 0 {
            let sample = |name: &str| {
                slots
                    .get(name)
                    .and_then(|slot| mesh.influences.get(slot))
                    .copied()
                    .unwrap_or(0.0)
            };
            println!(
                "{:>6.2}  {:>7.3}  {:>8.3}  {:>11.3}  {:>11.3}",
                compositor.elapsed(),
                sample("V_Open"),
                sample("Jaw_Open"),
                sample("Mouth_Close"),
                sample("Eye_Blink_L"),
            );
        }

        // One extra second past completion shows the decay back to rest.
        if state.mode == AvatarMode::Idle && compositor.elapsed() > duration + 1.0 {
            break;
        }
    }

    println!("done after {} frames", frame);
    Ok(())
}
