//! Loopback demo: an authority, a predicting client and a spectator exchange
//! commits over in-memory links.
//!
//! Inputs from the client travel on a jittered uplink and arrive out of
//! order; state commits are broadcast on a fixed-latency downlink. At the end
//! the settled part of each history is compared against the authority.
//!
//! ```text
//! RUST_LOG=tickback_netcode=debug cargo run -p loopback -- --latency 4 --jitter 3,0,1
//! ```

use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tickback_core::{
    FixedClock, Input, NetworkClock, ScriptedInput, State, Tick, TickContext, Vec3,
};
use tickback_netcode::{
    recv_message, send_message, Address, DelayedLink, LinkEndpoint, NetcodeConfig, TickController,
};
use tracing::{debug, error, info, trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "loopback", about = "Run client-side prediction over a delayed in-memory link")]
struct Args {
    /// Ticks to run
    #[arg(long, default_value_t = 120)]
    ticks: Tick,

    /// One-way latency in ticks
    #[arg(long, default_value_t = 3)]
    latency: Tick,

    /// Extra per-message uplink delay, cycled, comma separated
    #[arg(long, value_delimiter = ',', default_value = "2,0,1,0")]
    jitter: Vec<Tick>,

    /// Network tick rate in Hz
    #[arg(long, default_value_t = 30.0)]
    rate: f64,

    /// Ticks of scripted input before the client stands still
    #[arg(long, default_value_t = 80)]
    input_ticks: usize,

    /// RON file with netcode settings
    #[arg(long)]
    config: Option<PathBuf>,
}

struct Session {
    authority: TickController,
    client: TickController,
    spectator: TickController,
    script: ScriptedInput,
    uplink: DelayedLink,
    downlink: DelayedLink,
    authority_in: LinkEndpoint,
    authority_out: LinkEndpoint,
    client_in: LinkEndpoint,
    client_out: LinkEndpoint,
    spectator_in: LinkEndpoint,
    failure: Option<anyhow::Error>,
}

impl Session {
    fn new(config: &NetcodeConfig, args: &Args) -> Result<Self> {
        let uplink = DelayedLink::with_jitter(args.latency, args.jitter.clone());
        let downlink = DelayedLink::new(args.latency);
        let spawn = State::default();

        let script = (0..args.input_ticks)
            .map(|i| {
                let angle = i as f32 * 0.15;
                Input::new(Vec3::new(angle.cos(), 0.0, angle.sin()))
            })
            .collect();

        Ok(Self {
            authority: TickController::new(config.clone(), false, true, spawn, 0)?,
            client: TickController::new(config.clone(), true, false, spawn, 0)?,
            spectator: TickController::new(config.clone(), false, false, spawn, 0)?,
            script: ScriptedInput::new(script),
            authority_in: uplink.endpoint("authority")?,
            client_out: uplink.endpoint("client")?,
            authority_out: downlink.endpoint("authority")?,
            client_in: downlink.endpoint("client")?,
            spectator_in: downlink.endpoint("spectator")?,
            uplink,
            downlink,
            failure: None,
        })
    }

    fn on_tick(&mut self, ctx: &TickContext) {
        if self.failure.is_some() {
            return;
        }
        if let Err(err) = self.step(ctx) {
            error!(tick = ctx.tick, error = %err, "tick failed");
            self.failure = Some(err);
        }
    }

    fn step(&mut self, ctx: &TickContext) -> Result<()> {
        self.uplink.set_now(ctx.tick)?;
        self.downlink.set_now(ctx.tick)?;

        while let Some((message, _)) = recv_message(&self.authority_in)? {
            self.authority.receive(message);
        }
        while let Some((message, _)) = recv_message(&self.client_in)? {
            self.client.receive(message);
        }
        while let Some((message, _)) = recv_message(&self.spectator_in)? {
            self.spectator.receive(message);
        }

        self.authority.tick(ctx, &mut |_: Tick| Input::NONE);
        self.client.tick(ctx, &mut self.script);
        self.spectator.tick(ctx, &mut |_: Tick| Input::NONE);

        let viewers = [Address::from("client"), Address::from("spectator")];
        for message in self.authority.drain_outbox() {
            for viewer in &viewers {
                send_message(&self.authority_out, &message, viewer)?;
            }
        }
        let authority = Address::from("authority");
        for message in self.client.drain_outbox() {
            send_message(&self.client_out, &message, &authority)?;
        }

        // One render frame halfway through the coming interval
        let frame_time = ctx.time + ctx.delta_time * 0.5;
        let drawn = self.client.render(frame_time);
        let observed = self.spectator.render(frame_time);
        trace!(tick = ctx.tick, %drawn, %observed, "frame");
        Ok(())
    }

    fn report(&self, last_tick: Tick, round_trip: Tick) {
        let config = self.authority.config();
        let first = (last_tick - config.history_capacity as Tick + 1).max(1);
        let settled = last_tick - round_trip - config.display_offset;

        let mut client_error = 0.0f32;
        let mut spectator_error = 0.0f32;
        for tick in first..=settled {
            let truth = self.authority.state_at(tick).position;
            client_error = client_error.max(self.client.state_at(tick).position.distance(truth));
            spectator_error =
                spectator_error.max(self.spectator.state_at(tick).position.distance(truth));
        }

        let authority = self.authority.stats();
        let client = self.client.stats();
        info!(
            first,
            settled,
            client_error,
            spectator_error,
            tolerance = config.tolerance,
            "settled history compared against the authority"
        );
        info!(
            inputs = authority.inputs_received,
            passes = authority.resimulations,
            ticks = authority.resimulated_ticks,
            "authority"
        );
        info!(
            corrections = client.corrections_applied,
            confirmed = client.commits_unchanged,
            passes = client.resimulations,
            ticks = client.resimulated_ticks,
            "client"
        );
        info!(
            final_position = %self.authority.state_at(last_tick),
            "done"
        );
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<NetcodeConfig> {
    let Some(path) = path else {
        return Ok(NetcodeConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    NetcodeConfig::from_ron_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let max_jitter = args.jitter.iter().copied().max().unwrap_or(0);
    let round_trip = 2 * args.latency + max_jitter;
    ensure!(
        round_trip <= config.max_round_trip_ticks,
        "round trip of {round_trip} ticks exceeds max_round_trip_ticks = {}",
        config.max_round_trip_ticks
    );
    ensure!(args.rate > 0.0, "tick rate must be positive");

    let mut clock = FixedClock::new(1.0 / args.rate)?;
    let session = Rc::new(RefCell::new(Session::new(&config, &args)?));
    info!(
        ticks = args.ticks,
        latency = args.latency,
        round_trip,
        capacity = config.history_capacity,
        "starting loopback session"
    );

    let handle = Rc::clone(&session);
    let callback = clock.register(move |ctx| handle.borrow_mut().on_tick(ctx));
    while clock.current_tick() < args.ticks && session.borrow().failure.is_none() {
        clock.advance();
    }
    clock.unregister(callback)?;
    debug!(tick = clock.current_tick(), "detached from clock");

    if let Some(err) = session.borrow_mut().failure.take() {
        return Err(err);
    }
    session.borrow().report(clock.current_tick(), round_trip);
    Ok(())
}
