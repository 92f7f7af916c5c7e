//! End-to-end tests of the mailbox protocol: an engine runner and two agent
//! clients in separate threads, exchanging records through a shared mailbox.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use conquest::agent::{AgentConfig, AgentExit};
use conquest::runner::{GameResult, RunnerConfig};
use conquest::sync::CommandRecord;
use conquest::{
    AgentClient, EngineConfig, FileMailbox, GameEngine, GameRunner, Mailbox, MemoryMailbox,
    PlayerId, RandomAgent, TurnState, World, play_local,
};

fn engine(seed: u64) -> GameEngine {
    let config = EngineConfig {
        seed,
        ..EngineConfig::default()
    };
    GameEngine::new(World::classic().unwrap(), config).unwrap()
}

/// Run one game with the engine in this thread and both agents in their own.
fn play_threaded<M>(mailbox: &M, seed: u64, max_turns: u32) -> (GameResult, [AgentExit; 2])
where
    M: Mailbox + Clone + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let agent_config = AgentConfig {
        poll_interval: Duration::from_millis(1),
        idle_timeout: Some(Duration::from_secs(30)),
    };

    let handles = PlayerId::ALL.map(|player| {
        let mailbox = mailbox.clone();
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut client = AgentClient::connect(player, mailbox).unwrap();
            let mut agent = RandomAgent::new(seed.wrapping_add(u64::from(player.number())));
            client.run(&mut agent, agent_config, &stop).unwrap()
        })
    });

    let runner_config = RunnerConfig {
        max_turns,
        poll_interval: Duration::from_millis(1),
    };
    let result = GameRunner::new(engine(seed), mailbox.clone(), runner_config)
        .run()
        .unwrap();
    stop.store(true, Ordering::Relaxed);

    let exits = handles.map(|handle| handle.join().unwrap());
    (result, exits)
}

fn check_exits(result: &GameResult, exits: [AgentExit; 2]) {
    match result.winner {
        Some(winner) => {
            assert_eq!(exits[winner.index()], AgentExit::Finished(TurnState::Winner));
            assert_eq!(
                exits[winner.opponent().index()],
                AgentExit::Finished(TurnState::Loser)
            );
        }
        None => {
            for exit in exits {
                assert_eq!(exit, AgentExit::Stopped);
            }
        }
    }
}

#[test]
fn test_game_over_memory_mailbox() {
    let mailbox = MemoryMailbox::with_initial_commands();
    let (result, exits) = play_threaded(&mailbox, 11, 12);

    assert!(result.turns_played <= 12);
    assert!(result.actions[0] + result.actions[1] > 0);
    assert_eq!(result.final_territories[0] + result.final_territories[1], 42);
    check_exits(&result, exits);
}

#[test]
fn test_game_over_file_mailbox() {
    let dir = tempfile::tempdir().unwrap();
    let mailbox = FileMailbox::create(dir.path()).unwrap();
    let (result, exits) = play_threaded(&mailbox, 12, 4);

    assert!(result.turns_played <= 4);
    check_exits(&result, exits);

    // Every consumed command shows up in the final command counters.
    let submitted: u64 = PlayerId::ALL
        .iter()
        .map(|&p| mailbox.read_command(p).unwrap().unwrap().count)
        .sum();
    assert!(submitted >= result.actions[0] + result.actions[1]);

    // Both players' state records were published with the same count.
    let one = mailbox.read_state(PlayerId::One).unwrap().unwrap();
    let two = mailbox.read_state(PlayerId::Two).unwrap().unwrap();
    assert_eq!(one.count, two.count);
    assert_eq!(one.n_total_troops, two.enemy_n_total_troops);
    assert_eq!(one.enemy_n_total_troops, two.n_total_troops);
    assert!(dir.path().join("Logs/player_1.json").exists());
}

#[test]
fn test_resubmitted_count_is_ignored() {
    let mailbox = MemoryMailbox::with_initial_commands();
    let mut runner = GameRunner::new(engine(13), mailbox.clone(), RunnerConfig::default());
    runner.publish().unwrap();
    let active = runner.engine().active();

    let pass = CommandRecord::new(active, 1, &conquest::Command::PassTurn);
    mailbox.write_command(&pass).unwrap();
    runner.step().unwrap();
    assert_eq!(runner.engine().state(active), TurnState::Attacking);

    // The same record again must not advance the game a second time.
    mailbox.write_command(&pass).unwrap();
    runner.step().unwrap();
    assert_eq!(runner.engine().state(active), TurnState::Attacking);
    assert_eq!(runner.session(active).consumed(), 1);
}

#[test]
fn test_local_games_are_reproducible() {
    let play = |seed: u64| {
        let mut one = RandomAgent::new(seed);
        let mut two = RandomAgent::new(seed + 1);
        play_local(engine(seed), &mut [&mut one, &mut two], RunnerConfig::default()).unwrap()
    };

    for seed in [1, 2, 3] {
        assert_eq!(play(seed), play(seed));
    }
}
