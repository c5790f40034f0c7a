//! Lip-Sync Chain Tests
//!
//! End-to-end runs of the timeline → blend → map → composite chain against
//! a mock mesh.

use std::collections::HashMap;

use avatar_engine::{
    demo_timeline, AvatarMode, AvatarState, Compositor, EngineConfig, InfluenceSink, MeshId,
    SpeechSession, SpeechTrack, VisemeShapeTable, DEMO_DURATION,
};

/// A single fake mesh: slot index → last written influence.
#[derive(Default)]
struct MockMesh {
    influences: HashMap<usize, f32>,
    writes: usize,
}

impl InfluenceSink for MockMesh {
    fn set_influence(&mut self, _mesh: MeshId, slot: usize, value: f32) {
        self.influences.insert(slot, value);
        self.writes += 1;
    }
}

/// Registers every shape the CC4 table references on mesh 0, slot = order.
fn register_cc4(compositor: &mut Compositor) -> HashMap<String, usize> {
    let names: Vec<String> = VisemeShapeTable::cc4()
        .shape_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut slots = HashMap::new();
    for (slot, name) in names.iter().enumerate() {
        compositor.registry_mut().register(name, 0, slot);
        slots.insert(name.clone(), slot);
    }
    slots
}

fn quiet_config() -> EngineConfig {
    EngineConfig {
        idle_motion: false,
        ..EngineConfig::default()
    }
}

#[test]
fn demo_playback_moves_the_mouth_and_returns_to_idle() {
    let mut compositor = Compositor::with_seed(quiet_config(), 11);
    let slots = register_cc4(&mut compositor);
    let mut mesh = MockMesh::default();

    let mut state = AvatarState::new();
    let track = SpeechTrack {
        timeline: demo_timeline(),
        ..SpeechTrack::default()
    };
    state.speak(&track, SpeechSession::demo(DEMO_DURATION));
    assert_eq!(state.mode, AvatarMode::Speaking);

    let delta = 1.0 / 60.0;
    let mut open_peak = 0.0f32;
    let mut close_peak = 0.0f32;

    // Two full demo durations: playback plus decay back to rest.
    for _ in 0..(2.0 * DEMO_DURATION / delta as f64).ceil() as usize {
        compositor.tick(delta, &mut state, &mut mesh);
        open_peak = open_peak.max(mesh.influences[&slots["V_Open"]]);
        close_peak = close_peak.max(mesh.influences[&slots["Mouth_Close"]]);
    }

    assert!(open_peak > 0.3, "AA segments never opened the mouth: {}", open_peak);
    assert!(close_peak > 0.3, "MBP segment never closed the lips: {}", close_peak);
    assert_eq!(state.mode, AvatarMode::Idle, "demo must auto-complete");

    // After completion everything decays toward rest.
    let residual = mesh.influences[&slots["V_Open"]];
    assert!(residual < 0.05, "V_Open stuck at {} after completion", residual);
}

#[test]
fn speaking_frames_with_active_segment_produce_lip_output() {
    let mut compositor = Compositor::with_seed(quiet_config(), 11);
    let slots = register_cc4(&mut compositor);
    let mut mesh = MockMesh::default();

    let mut state = AvatarState::new();
    let track = SpeechTrack::from_json(
        r#"{"timeline": [{"start": 0.0, "end": 0.5, "viseme": "AA"}]}"#,
    )
    .unwrap();
    state.speak(&track, SpeechSession::demo(0.5));

    compositor.tick(1.0 / 60.0, &mut state, &mut mesh);
    compositor.tick(1.0 / 60.0, &mut state, &mut mesh);

    assert!(
        mesh.influences[&slots["V_Open"]] > 0.0,
        "an active segment at the sampled time must contribute"
    );
}

#[test]
fn empty_timeline_holds_the_rest_pose() {
    let mut compositor = Compositor::with_seed(quiet_config(), 11);
    let slots = register_cc4(&mut compositor);
    let mut mesh = MockMesh::default();

    let mut state = AvatarState::new();
    state.speak(&SpeechTrack::default(), SpeechSession::demo(1.0));

    for _ in 0..120 {
        compositor.tick(1.0 / 60.0, &mut state, &mut mesh);
    }

    for (name, slot) in &slots {
        let value = mesh.influences.get(slot).copied().unwrap_or(0.0);
        assert!(
            value.abs() < 1e-4,
            "{} should stay at rest with no timeline, got {}",
            name,
            value
        );
    }
}

#[test]
fn shape_table_entries_without_bindings_are_ignored() {
    let mut compositor = Compositor::with_seed(quiet_config(), 11);
    // Only register the jaw; V_Open and friends stay unbound.
    compositor.registry_mut().register("Jaw_Open", 0, 0);
    let mut mesh = MockMesh::default();

    let mut state = AvatarState::new();
    let track = SpeechTrack::from_json(
        r#"{"timeline": [{"start": 0.0, "end": 0.5, "viseme": "AA"}]}"#,
    )
    .unwrap();
    state.speak(&track, SpeechSession::demo(0.5));

    for _ in 0..30 {
        compositor.tick(1.0 / 60.0, &mut state, &mut mesh);
    }

    assert_eq!(
        mesh.influences.len(),
        1,
        "only the registered slot may be written"
    );
    assert!(mesh.influences[&0] > 0.0, "the bound jaw still animates");
}

#[test]
fn tone_scales_the_mouth_opening() {
    let peak_for = |tone: &str| -> f32 {
        let mut compositor = Compositor::with_seed(quiet_config(), 11);
        let slots = register_cc4(&mut compositor);
        let mut mesh = MockMesh::default();

        let mut state = AvatarState::new();
        let track = SpeechTrack::from_json(&format!(
            r#"{{"timeline": [{{"start": 0.0, "end": 0.5, "viseme": "AA"}}], "tone": "{tone}"}}"#,
        ))
        .unwrap();
        state.speak(&track, SpeechSession::demo(0.5));

        let mut peak = 0.0f32;
        for _ in 0..60 {
            compositor.tick(1.0 / 60.0, &mut state, &mut mesh);
            peak = peak.max(mesh.influences[&slots["V_Open"]]);
        }
        peak
    };

    let calm = peak_for("calm");
    let excited = peak_for("excited");
    assert!(
        excited > calm,
        "excited ({}) should open wider than calm ({})",
        excited,
        calm
    );
}
