use socium_core::{
    AgentSnapshot, BehaviorState, ENERGY_DECAY, Faction, Personality, PersonalityCatalog,
    Simulation, SimulationConfig, Tick,
};

fn personality(
    id: &str,
    name: &str,
    color: &str,
    faction: Faction,
    aggression: f32,
    empathy: f32,
    energy: f32,
) -> Personality {
    Personality {
        id: id.to_owned(),
        name: name.to_owned(),
        color: color.to_owned(),
        faction,
        aggression,
        empathy,
        energy,
    }
}

fn full_catalog() -> PersonalityCatalog {
    PersonalityCatalog::new(vec![
        personality("ent-razor", "Razor", "#d11440", Faction::Entropics, 0.9, 0.1, 0.8),
        personality("ent-static", "Static", "#aa2255", Faction::Entropics, 0.7, 0.2, 0.5),
        personality("lum-beacon", "Beacon", "#ffd447", Faction::Luminaries, 0.2, 0.8, 0.6),
        personality("lum-ember", "Ember", "#ffaa33", Faction::Luminaries, 0.3, 0.6, 0.7),
        personality("inr-moss", "Moss", "#8a9a7a", Faction::Inert, 0.1, 0.3, 0.2),
    ])
    .expect("catalog")
}

fn seeded_config(agent_count: usize, seed: u64) -> SimulationConfig {
    SimulationConfig {
        agent_count,
        rng_seed: Some(seed),
        ..SimulationConfig::default()
    }
}

#[test]
fn hundred_ticks_keep_positions_in_bounds_and_produce_contact() {
    let mut sim =
        Simulation::new(seeded_config(500, 0xDEAD_BEEF), full_catalog()).expect("simulation");

    let mut saw_pursuit = false;
    for _ in 0..100 {
        let summary = sim.step();
        if summary.hunting > 0 || summary.fleeing > 0 {
            saw_pursuit = true;
        }
        for agent in sim.agents() {
            assert!(
                (0.0..800.0).contains(&agent.position.x),
                "x out of bounds: {}",
                agent.position.x
            );
            assert!(
                (0.0..600.0).contains(&agent.position.y),
                "y out of bounds: {}",
                agent.position.y
            );
        }
    }

    assert_eq!(sim.tick(), Tick(100));
    assert!(
        saw_pursuit,
        "500 mixed-faction agents should meet within 100 ticks"
    );
}

#[test]
fn population_is_conserved_across_every_operation() {
    let mut sim = Simulation::new(seeded_config(60, 7), full_catalog()).expect("simulation");
    assert_eq!(sim.agent_count(), 60);

    for round in 0..10 {
        sim.step();
        if round % 3 == 0 {
            sim.glitch();
        }
        if round % 4 == 0 {
            sim.observer_collapse();
        }
        assert_eq!(sim.agent_count(), 60);
        assert_eq!(sim.snapshot().len(), 60);
    }

    let ids: std::collections::HashSet<u32> =
        sim.snapshot().into_iter().map(|record| record.id).collect();
    assert_eq!(ids.len(), 60, "agent ids must stay unique and stable");
}

#[test]
fn energy_decays_by_the_fixed_decrement_each_tick() {
    // A lone agent never meets anyone, so the only energy change is decay.
    let mut sim = Simulation::new(seeded_config(1, 3), full_catalog()).expect("simulation");

    let mut previous = sim.agents()[0].energy;
    for ticks in 1..=20 {
        sim.step();
        let current = sim.agents()[0].energy;
        assert!(current < previous, "energy must strictly decrease");
        let expected = 1.0 - ticks as f32 * ENERGY_DECAY;
        assert!(
            (current - expected).abs() < 1e-5,
            "tick {ticks}: energy {current} expected {expected}"
        );
        previous = current;
    }
}

#[test]
fn identical_seeds_produce_identical_runs() {
    let mut sim_a = Simulation::new(seeded_config(50, 0xFACADE), full_catalog()).expect("a");
    let mut sim_b = Simulation::new(seeded_config(50, 0xFACADE), full_catalog()).expect("b");

    for _ in 0..50 {
        sim_a.step();
        sim_b.step();
    }
    sim_a.glitch();
    sim_b.glitch();

    assert_eq!(sim_a.snapshot(), sim_b.snapshot());

    let mut sim_c = Simulation::new(seeded_config(50, 0xC0FFEE), full_catalog()).expect("c");
    for _ in 0..50 {
        sim_c.step();
    }
    assert_ne!(
        sim_a.snapshot(),
        sim_c.snapshot(),
        "a different seed should diverge"
    );
}

#[test]
fn glitch_relocates_exactly_a_fifth_and_nothing_else() {
    let mut sim = Simulation::new(seeded_config(50, 21), full_catalog()).expect("simulation");
    for _ in 0..3 {
        sim.step();
    }

    let before = sim.snapshot();
    sim.glitch();
    let after = sim.snapshot();

    let mut moved = 0;
    for (was, now) in before.iter().zip(&after) {
        if was.x != now.x || was.y != now.y {
            moved += 1;
        }
        assert_eq!(was.id, now.id);
        assert_eq!(was.personality_id, now.personality_id);
        assert_eq!(was.faction, now.faction);
        assert_eq!(was.energy, now.energy);
        assert_eq!(was.resource, now.resource);
        assert_eq!(was.state, now.state);
        assert_eq!(was.is_deactivated, now.is_deactivated);
    }
    assert_eq!(moved, 10, "glitch must relocate floor(50 * 0.2) agents");

    let velocities_before: Vec<_> = sim.agents().iter().map(|a| a.velocity).collect();
    sim.glitch();
    let velocities_after: Vec<_> = sim.agents().iter().map(|a| a.velocity).collect();
    assert_eq!(velocities_before, velocities_after);
}

#[test]
fn observer_collapse_freezes_without_teleporting() {
    let mut sim = Simulation::new(seeded_config(40, 11), full_catalog()).expect("simulation");
    for _ in 0..5 {
        sim.step();
    }

    let before = sim.snapshot();
    sim.observer_collapse();
    let after = sim.snapshot();

    for (was, now) in before.iter().zip(&after) {
        assert_eq!(was.x, now.x);
        assert_eq!(was.y, now.y);
        assert_eq!(was.energy, now.energy);
        assert_eq!(was.resource, now.resource);
        assert_eq!(was.personality_id, now.personality_id);
        assert_eq!(now.state, BehaviorState::Idle);
    }
    for agent in sim.agents() {
        assert_eq!(agent.velocity.vx, 0.0);
        assert_eq!(agent.velocity.vy, 0.0);
    }
}

#[test]
fn reset_rebuilds_from_scratch() {
    let mut sim = Simulation::new(seeded_config(50, 5), full_catalog()).expect("simulation");
    for _ in 0..10 {
        sim.step();
    }
    assert_eq!(sim.tick(), Tick(10));
    assert!(sim.history().count() > 0);

    let next = SimulationConfig {
        width: 400.0,
        height: 300.0,
        agent_count: 30,
        rng_seed: Some(99),
        ..SimulationConfig::default()
    };
    sim.reset(next, full_catalog()).expect("reset");

    assert_eq!(sim.tick(), Tick::zero());
    assert_eq!(sim.agent_count(), 30);
    assert_eq!(sim.history().count(), 0);
    for agent in sim.agents() {
        assert!((0.0..400.0).contains(&agent.position.x));
        assert!((0.0..300.0).contains(&agent.position.y));
    }
}

#[test]
fn failed_reset_leaves_state_untouched() {
    let mut sim = Simulation::new(seeded_config(20, 5), full_catalog()).expect("simulation");
    for _ in 0..4 {
        sim.step();
    }

    let bad = SimulationConfig {
        width: -10.0,
        ..SimulationConfig::default()
    };
    assert!(sim.reset(bad, full_catalog()).is_err());

    assert_eq!(sim.tick(), Tick(4));
    assert_eq!(sim.agent_count(), 20);
}

#[test]
fn snapshot_serializes_with_the_boundary_field_names() {
    let sim = Simulation::new(seeded_config(5, 1), full_catalog()).expect("simulation");
    let snapshot = sim.snapshot();
    let value = serde_json::to_value(&snapshot).expect("json");

    let records = value.as_array().expect("array");
    assert_eq!(records.len(), 5);
    let record = records[0].as_object().expect("object");
    for key in [
        "id",
        "personality_id",
        "x",
        "y",
        "faction",
        "energy",
        "resource",
        "name",
        "color",
        "state",
        "is_deactivated",
    ] {
        assert!(record.contains_key(key), "missing key {key}");
    }
    assert_eq!(record["state"], "IDLE");
    let faction = record["faction"].as_str().expect("faction string");
    assert!(matches!(faction, "Entropics" | "Luminaries" | "Inert"));

    let roundtrip: Vec<AgentSnapshot> = serde_json::from_value(value).expect("roundtrip");
    assert_eq!(roundtrip, snapshot);
}
