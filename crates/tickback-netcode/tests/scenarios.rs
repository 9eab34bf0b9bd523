//! End-to-end reconciliation scenarios between an authority and a client,
//! with messages handed over directly.

use tickback_core::{Input, State, Tick, TickContext, TickHistory, Vec3};
use tickback_netcode::{
    CommitOutcome, HistoryBuffer, InputCommit, NetMessage, NetcodeConfig, StateCommit,
    TickController,
};

const DT: f64 = 0.1;

fn ctx(tick: Tick) -> TickContext {
    TickContext {
        tick,
        time: tick as f64 * DT,
        delta_time: DT,
    }
}

fn right() -> Input {
    Input::new(Vec3::new(1.0, 0.0, 0.0))
}

fn idle(_: Tick) -> Input {
    Input::NONE
}

fn config() -> NetcodeConfig {
    NetcodeConfig {
        history_capacity: 64,
        speed: 2.0,
        ..Default::default()
    }
}

fn state_commits(messages: &[NetMessage]) -> Vec<StateCommit> {
    messages
        .iter()
        .filter_map(|m| match m {
            NetMessage::StateCommit(c) => Some(*c),
            NetMessage::InputCommit(_) => None,
        })
        .collect()
}

#[test]
fn late_input_is_resimulated_and_broadcast() {
    let mut authority = TickController::new(config(), false, true, State::default(), 0).unwrap();
    let mut client = TickController::new(config(), true, false, State::default(), 0).unwrap();
    let mut client_input = |tick: Tick| if tick == 5 { right() } else { Input::NONE };

    // Client predicts ticks 1..=5 and sends its inputs; only tick 4 arrives in time.
    let mut uplink = Vec::new();
    for tick in 1..=5 {
        client.tick(&ctx(tick), &mut client_input);
        uplink.extend(client.drain_outbox());
    }
    authority.receive(uplink[3]);
    authority.tick(&ctx(4), &mut idle);
    assert_eq!(authority.state_at(5), State::default());
    authority.drain_outbox();

    // The input for tick 5 arrives late
    assert_eq!(authority.receive(uplink[4]), CommitOutcome::Applied);
    authority.tick(&ctx(6), &mut idle);
    assert!(authority
        .state_at(5)
        .approx_eq(&State::at(0.2, 0.0, 0.0), 1e-6));

    let commits = state_commits(&authority.drain_outbox());
    let tick5 = commits.iter().find(|c| c.tick == 5).unwrap();
    assert!(tick5.state.approx_eq(&State::at(0.2, 0.0, 0.0), 1e-6));

    // Client had nothing buffered for tick 5 beyond its spawn state
    assert_eq!(client.receive_state_commit(*tick5), CommitOutcome::Applied);
    client.tick(&ctx(6), &mut client_input);
    assert!(client
        .state_at(5)
        .approx_eq(&authority.state_at(5), config().tolerance));
    assert!(client
        .state_at(7)
        .approx_eq(&authority.state_at(7), config().tolerance));
}

#[test]
fn repeated_state_commit_changes_nothing() {
    let mut client = TickController::new(config(), true, false, State::default(), 0).unwrap();
    let commit = StateCommit {
        state: State::at(1.0, 0.0, 0.0),
        tick: 3,
    };

    assert_eq!(client.receive_state_commit(commit), CommitOutcome::Applied);
    let pending = client.pending_state_resim();
    let snapshot: Vec<_> = client.states().iter().map(|(t, s)| (t, *s)).collect();

    assert_eq!(client.receive_state_commit(commit), CommitOutcome::Unchanged);
    let again: Vec<_> = client.states().iter().map(|(t, s)| (t, *s)).collect();
    assert_eq!(snapshot, again);
    assert_eq!(client.pending_state_resim(), pending);
}

#[test]
fn stale_commit_arriving_last_overwrites_newer() {
    let mut client = TickController::new(config(), true, false, State::default(), 0).unwrap();
    let corrected = StateCommit {
        state: State::at(0.6, 0.0, 0.0),
        tick: 5,
    };
    let stale = StateCommit {
        state: State::at(0.4, 0.0, 0.0),
        tick: 5,
    };

    assert_eq!(client.receive_state_commit(corrected), CommitOutcome::Applied);
    assert_eq!(client.receive_state_commit(stale), CommitOutcome::Applied);
    assert_eq!(client.state_at(5), State::at(0.4, 0.0, 0.0));
    assert_eq!(client.pending_state_resim(), Some(5));
}

#[test]
fn identical_histories_resimulate_bit_identically() {
    let script: Vec<Input> = (0..30)
        .map(|i| Input::new(Vec3::new((i as f32 * 0.3).sin(), 0.0, (i as f32 * 0.7).cos())))
        .collect();

    let run = || {
        let mut host = TickController::new(config(), true, true, State::at(1.0, 2.0, 3.0), 0)
            .unwrap();
        let mut source = |tick: Tick| script[(tick as usize - 1) % script.len()];
        for tick in 1..=30 {
            host.tick(&ctx(tick), &mut source);
        }
        (1..=31).map(|t| host.state_at(t)).collect::<Vec<_>>()
    };

    let a = run();
    let b = run();
    for (sa, sb) in a.iter().zip(&b) {
        assert_eq!(sa.position.x.to_bits(), sb.position.x.to_bits());
        assert_eq!(sa.position.y.to_bits(), sb.position.y.to_bits());
        assert_eq!(sa.position.z.to_bits(), sb.position.z.to_bits());
    }
}

#[test]
fn reordered_inputs_replay_from_the_oldest() {
    let mut authority = TickController::new(config(), false, true, State::default(), 0).unwrap();
    for tick in [7, 3, 5] {
        authority.receive(NetMessage::InputCommit(InputCommit {
            input: right(),
            tick,
        }));
    }
    assert_eq!(authority.pending_input_resim(), Some(3));

    authority.tick(&ctx(8), &mut idle);
    let range = authority.last_resimulated().unwrap();
    assert_eq!((range.from, range.to), (3, 9));
    assert!(authority
        .state_at(9)
        .approx_eq(&State::at(0.6, 0.0, 0.0), 1e-5));
}

#[test]
fn fresh_buffer_reads_default_far_ahead() {
    let buffer = HistoryBuffer::new(64, State::at(5.0, 0.0, 0.0), 0);
    assert_eq!(buffer.get(1000), State::at(5.0, 0.0, 0.0));
}

#[test]
fn evicted_tick_reads_default() {
    let mut buffer = HistoryBuffer::new(64, State::default(), 0);
    buffer.set(State::at(1.0, 0.0, 0.0), 3);
    buffer.set(State::at(2.0, 0.0, 0.0), 67);
    assert_eq!(buffer.get(3), State::default());
    assert_eq!(buffer.get(67), State::at(2.0, 0.0, 0.0));
}
