use arena_director_core::{
    ActiveEnemyHandle, Command, EnemyId, EnemyKind, EnemyPrototype, Event, LootDrop, LootKind,
    Vec2, WaveNumber,
};
use arena_director_system_run_state::{BeginWaveError, Config, RunPhase, RunStateMachine};
use arena_director_world::{self as world, World};

const DT: f32 = 0.25;

fn spawn_wave(world: &mut World, drops: &[LootDrop]) -> Vec<ActiveEnemyHandle> {
    let mut events = Vec::new();
    for (index, drop) in drops.iter().enumerate() {
        world::apply(
            world,
            Command::SpawnEnemy {
                prototype: EnemyPrototype::new(EnemyKind::new("meleeA"), 10, drop.clone()),
                position: Vec2::new(index as f32, 0.0),
                spawn_point: index,
            },
            &mut events,
        );
    }
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned {
                enemy,
                kind,
                spawn_point,
                ..
            } => Some(ActiveEnemyHandle::new(*enemy, kind.clone(), *spawn_point)),
            _ => None,
        })
        .collect()
}

fn melee_wave(world: &mut World, count: usize) -> Vec<ActiveEnemyHandle> {
    spawn_wave(world, &vec![LootDrop::new().with("credits", 10); count])
}

fn kill(world: &mut World, machine: &mut RunStateMachine, enemy: EnemyId) {
    let mut events = Vec::new();
    world::apply(world, Command::KillEnemy { enemy }, &mut events);
    machine.handle_events(&events);
}

struct Step {
    commands: Vec<Command>,
    events: Vec<Event>,
}

fn tick(machine: &mut RunStateMachine, world: &World, dt: f32) -> Step {
    let mut commands = Vec::new();
    let mut events = Vec::new();
    machine.tick(dt, world, &mut commands, &mut events);
    Step { commands, events }
}

fn count_wave_completed(events: &[Event], wave: u32) -> usize {
    events
        .iter()
        .filter(|event| {
            matches!(event, Event::WaveCompleted { wave: w } if *w == WaveNumber::new(wave))
        })
        .count()
}

#[test]
fn wave_completes_only_after_last_enemy_dies() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config::new(5));
    let handles = melee_wave(&mut world, 3);
    let _ = machine
        .begin_wave(WaveNumber::new(1), handles.clone())
        .expect("wave 1");

    kill(&mut world, &mut machine, handles[0].enemy());
    kill(&mut world, &mut machine, handles[1].enemy());
    assert!(!machine.is_wave_complete(&world));
    assert!(tick(&mut machine, &world, DT).events.is_empty());

    kill(&mut world, &mut machine, handles[2].enemy());
    assert!(machine.is_wave_complete(&world));

    let mut events = Vec::new();
    for _ in 0..10 {
        events.extend(tick(&mut machine, &world, DT).events);
        assert!(machine.is_wave_complete(&world));
    }
    assert_eq!(count_wave_completed(&events, 1), 1);
}

#[test]
fn is_wave_complete_never_announces() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config::new(2));
    let handles = melee_wave(&mut world, 1);
    let _ = machine
        .begin_wave(WaveNumber::new(1), handles.clone())
        .expect("wave 1");
    kill(&mut world, &mut machine, handles[0].enemy());

    for _ in 0..5 {
        assert!(machine.is_wave_complete(&world));
    }

    assert!(!machine.state().wave_acknowledged());
    assert_eq!(machine.phase(), RunPhase::WaveActive);
    assert_eq!(count_wave_completed(&tick(&mut machine, &world, DT).events, 1), 1);
}

#[test]
fn externally_destroyed_enemies_are_pruned_on_poll() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config::new(3));
    let handles = melee_wave(&mut world, 2);
    let _ = machine
        .begin_wave(WaveNumber::new(1), handles.clone())
        .expect("wave 1");

    // Another system removes the enemies without telling the machine.
    let mut ignored = Vec::new();
    world::apply(
        &mut world,
        Command::DespawnEnemy {
            enemy: handles[0].enemy(),
        },
        &mut ignored,
    );
    world::apply(
        &mut world,
        Command::KillEnemy {
            enemy: handles[1].enemy(),
        },
        &mut ignored,
    );
    assert_eq!(machine.roster().len(), 2);

    let step = tick(&mut machine, &world, DT);

    assert_eq!(machine.roster().len(), 0);
    assert_eq!(count_wave_completed(&step.events, 1), 1);
    assert!(machine.ledger().is_empty(), "unseen deaths carry no loot");
}

#[test]
fn final_wave_completes_the_run_once() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config {
        total_waves: 5,
        auto_progress: false,
        transition_delay: 0.0,
    });

    let mut events = Vec::new();
    for wave in 1..=5 {
        let handles = melee_wave(&mut world, 1);
        let _ = machine
            .begin_wave(WaveNumber::new(wave), handles.clone())
            .expect("wave begins");
        kill(&mut world, &mut machine, handles[0].enemy());
        events.extend(tick(&mut machine, &world, DT).events);
        if wave < 5 {
            assert_eq!(machine.phase(), RunPhase::WaveCleared);
            assert!(!machine.state().run_completed());
        }
    }

    assert!(machine.state().run_completed());
    assert_eq!(machine.state().current_wave(), WaveNumber::new(5));
    assert_eq!(machine.phase(), RunPhase::RunComplete);

    let handles = melee_wave(&mut world, 1);
    let _ = machine
        .begin_wave(WaveNumber::new(6), handles.clone())
        .expect("renumbering is accepted");
    kill(&mut world, &mut machine, handles[0].enemy());
    events.extend(tick(&mut machine, &world, DT).events);

    let run_completions = events
        .iter()
        .filter(|event| matches!(event, Event::RunCompleted { .. }))
        .count();
    assert_eq!(run_completions, 1);
    assert_eq!(count_wave_completed(&events, 6), 1);
    assert_eq!(machine.state().current_wave(), WaveNumber::new(6));
    assert!(machine.state().run_completed());
}

#[test]
fn loot_is_order_independent() {
    let drops = [
        LootDrop::new().with("credits", 10),
        LootDrop::new().with("credits", 15).with("seeds", 2),
    ];

    let totals = |order: [usize; 2]| {
        let mut world = World::new();
        let mut machine = RunStateMachine::default();
        let handles = spawn_wave(&mut world, &drops);
        let _ = machine
            .begin_wave(WaveNumber::new(1), handles.clone())
            .expect("wave 1");
        for index in order {
            kill(&mut world, &mut machine, handles[index].enemy());
        }
        machine.take_ledger().drain()
    };

    let forward = totals([0, 1]);
    let backward = totals([1, 0]);

    assert_eq!(forward, backward);
    assert_eq!(forward.get(&LootKind::new("credits")), Some(&25));
    assert_eq!(forward.get(&LootKind::new("seeds")), Some(&2));
}

#[test]
fn transition_counts_down_before_requesting_next_wave() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config {
        total_waves: 3,
        auto_progress: true,
        transition_delay: 2.0,
    });
    let handles = melee_wave(&mut world, 1);
    let _ = machine
        .begin_wave(WaveNumber::new(1), handles.clone())
        .expect("wave 1");
    kill(&mut world, &mut machine, handles[0].enemy());

    let step = tick(&mut machine, &world, DT);
    assert!(machine.state().transitioning());
    assert_eq!(machine.phase(), RunPhase::WaveTransition);
    assert!(step.commands.is_empty());
    assert!(step.events.contains(&Event::TransitionStarted {
        next: WaveNumber::new(2),
        delay: 2.0,
    }));

    let mut previous = machine.state().transition_remaining();
    let mut ticks = 0;
    loop {
        let step = tick(&mut machine, &world, 0.5);
        ticks += 1;
        if !step.commands.is_empty() {
            assert_eq!(
                step.commands,
                vec![Command::StartWave {
                    wave: WaveNumber::new(2)
                }]
            );
            assert!(!machine.state().transitioning());
            break;
        }
        let remaining = machine.state().transition_remaining();
        assert!(remaining < previous, "countdown must strictly decrease");
        assert!(remaining > 0.0, "next wave requested late");
        previous = remaining;
    }
    assert_eq!(ticks, 4, "2.0s at 0.5s per tick");
}

#[test]
fn disabling_auto_progress_mid_transition_idles() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config {
        total_waves: 3,
        auto_progress: true,
        transition_delay: 1.0,
    });
    let handles = melee_wave(&mut world, 1);
    let _ = machine
        .begin_wave(WaveNumber::new(1), handles.clone())
        .expect("wave 1");
    kill(&mut world, &mut machine, handles[0].enemy());
    let _ = tick(&mut machine, &world, DT);

    machine.set_auto_progress(false);
    let step = tick(&mut machine, &world, 5.0);

    assert!(step.commands.is_empty());
    assert_eq!(machine.phase(), RunPhase::WaveCleared);
}

#[test]
fn wave_index_never_moves_backwards() {
    let mut world = World::new();
    let mut machine = RunStateMachine::default();
    let _ = machine
        .begin_wave(WaveNumber::new(3), melee_wave(&mut world, 1))
        .expect("wave 3");

    let result = machine.begin_wave(WaveNumber::new(2), Vec::new());

    assert_eq!(
        result,
        Err(BeginWaveError::WaveRegression {
            current: WaveNumber::new(3),
            requested: WaveNumber::new(2),
        })
    );
    assert_eq!(machine.state().current_wave(), WaveNumber::new(3));
    assert_eq!(machine.roster().len(), 1);
}

#[test]
fn reset_discards_in_flight_state() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config::new(4));
    let handles = melee_wave(&mut world, 2);
    let _ = machine
        .begin_wave(WaveNumber::new(2), handles.clone())
        .expect("wave 2");
    kill(&mut world, &mut machine, handles[0].enemy());

    let drained = machine.reset();

    assert_eq!(drained.len(), 1);
    assert_eq!(machine.phase(), RunPhase::NoWave);
    assert!(machine.ledger().is_empty());
    assert!(machine.roster().is_empty());
    assert_eq!(machine.state().total_waves(), 4);
    assert!(machine
        .begin_wave(WaveNumber::new(1), Vec::new())
        .is_ok());
}

#[test]
fn beginning_a_wave_cancels_a_running_countdown() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config::new(4));
    let handles = melee_wave(&mut world, 1);
    let _ = machine
        .begin_wave(WaveNumber::new(1), handles.clone())
        .expect("wave 1");
    kill(&mut world, &mut machine, handles[0].enemy());
    let _ = tick(&mut machine, &world, DT);
    assert!(machine.state().transitioning());

    let _ = machine
        .begin_wave(WaveNumber::new(2), melee_wave(&mut world, 1))
        .expect("manual wave 2");

    assert!(!machine.state().transitioning());
    assert_eq!(machine.state().transition_remaining(), 0.0);
    assert_eq!(machine.phase(), RunPhase::WaveActive);
    assert!(tick(&mut machine, &world, 10.0).commands.is_empty());
}

#[test]
fn cleared_wave_cannot_be_restarted() {
    let mut world = World::new();
    let mut machine = RunStateMachine::new(Config {
        total_waves: 2,
        auto_progress: false,
        transition_delay: 0.0,
    });

    let mut events = Vec::new();
    for wave in 1..=2 {
        let handles = melee_wave(&mut world, 1);
        let _ = machine
            .begin_wave(WaveNumber::new(wave), handles.clone())
            .expect("wave begins");
        kill(&mut world, &mut machine, handles[0].enemy());
        events.extend(tick(&mut machine, &world, DT).events);

        let again = machine.begin_wave(WaveNumber::new(wave), melee_wave(&mut world, 1));
        assert_eq!(
            again,
            Err(BeginWaveError::WaveAlreadyCleared(WaveNumber::new(wave)))
        );
        events.extend(tick(&mut machine, &world, DT).events);
    }

    assert_eq!(count_wave_completed(&events, 1), 1);
    assert_eq!(count_wave_completed(&events, 2), 1);
    assert_eq!(machine.phase(), RunPhase::RunComplete);
}
