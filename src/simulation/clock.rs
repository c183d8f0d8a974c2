//! Simulation clock - the full tick and fixed-rate pacing
//!
//! `Simulation::step` is the complete tick: the five in-world phases, then
//! draining the decision bridge, then (every `evolution_period` ticks) the
//! evolution period. Pacing only ever sleeps between ticks, never inside one.

use std::ops::ControlFlow;
use std::time::Instant;

use crate::decision::DecisionBridge;
use crate::simulation::decisions::{attach_results, run_evolution_period};
use crate::simulation::tick::{run_simulation_tick, SimulationEvent};
use crate::world::World;

pub struct Simulation {
    pub world: World,
    bridge: Option<DecisionBridge>,
}

impl Simulation {
    /// A simulation without external decisions
    pub fn new(world: World) -> Self {
        Self {
            world,
            bridge: None,
        }
    }

    pub fn with_bridge(world: World, bridge: DecisionBridge) -> Self {
        Self {
            world,
            bridge: Some(bridge),
        }
    }

    pub fn bridge(&self) -> Option<&DecisionBridge> {
        self.bridge.as_ref()
    }

    /// Advance exactly one tick
    pub fn step(&mut self) -> Vec<SimulationEvent> {
        let mut events = run_simulation_tick(&mut self.world);

        if let Some(bridge) = self.bridge.as_mut() {
            let results = bridge.drain();
            if !results.is_empty() {
                attach_results(&mut self.world, results, &mut events);
            }
        }

        if self.world.current_tick % self.world.config.evolution_period == 0 {
            run_evolution_period(&mut self.world, self.bridge.as_mut(), &mut events);
            tracing::debug!(tick = self.world.current_tick, "evolution period");
        }

        events
    }

    /// Advance `ticks` ticks as fast as possible
    /// Returns every event produced along the way
    pub fn run_for(&mut self, ticks: u64) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.step());
        }
        events
    }

    /// Run at the configured tick rate until `on_tick` breaks or `limit`
    /// ticks have run
    ///
    /// A tick that overruns its slot is not made up for; the next one
    /// starts immediately.
    pub fn run_paced<F>(&mut self, limit: Option<u64>, mut on_tick: F)
    where
        F: FnMut(&World, &[SimulationEvent]) -> ControlFlow<()>,
    {
        let period = self.world.config.tick_duration();
        let mut ran = 0u64;

        while limit.map_or(true, |limit| ran < limit) {
            let started = Instant::now();
            let events = self.step();
            ran += 1;

            if on_tick(&self.world, &events).is_break() {
                break;
            }

            if let Some(remaining) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;

    fn config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(8),
            evolution_period: 5,
            tick_rate_hz: 1000,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_evolution_period_ages_population() {
        let mut sim = Simulation::new(World::seeded(config()).unwrap());
        let ids: Vec<_> = sim.world.organisms().iter().map(|o| o.id).collect();

        sim.run_for(4);
        for id in &ids {
            if let Some(o) = sim.world.organism(*id) {
                assert_eq!(o.age, 0);
            }
        }

        sim.run_for(1);
        assert_eq!(sim.world.current_tick, 5);
        for id in &ids {
            if let Some(o) = sim.world.organism(*id) {
                assert_eq!(o.age, 1);
            }
        }
    }

    #[test]
    fn test_run_paced_stops_on_break() {
        let mut sim = Simulation::new(World::seeded(config()).unwrap());
        let mut seen = 0;
        sim.run_paced(None, |_, _| {
            seen += 1;
            if seen == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(sim.world.current_tick, 3);
    }

    #[test]
    fn test_run_paced_respects_limit() {
        let mut sim = Simulation::new(World::seeded(config()).unwrap());
        sim.run_paced(Some(4), |_, _| ControlFlow::Continue(()));
        assert_eq!(sim.world.current_tick, 4);
        assert!(sim.bridge().is_none());
    }
}
