use crate::{
    ChipError, EdgeId, Fluid, FluidDef, FluidId, FluidRegistry, HydraulicSolver, InvalidReference,
    MassTransportIntegrator, Mixture, Network, SimulationConfig, SimulationResults, Snapshot,
    TransportState, advect, check_non_negative, models::MembraneModel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationState {
    Uninitialized,
    Ready,
    Running,
    Completed,
    Failed,
}

/// A fluid delivered by a pump from `start_time` [s] on
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MixtureInjection {
    pub fluid: FluidId,
    pub pump: EdgeId,
    pub start_time: f64,
}

/// Time stepping driver for species transport on a chip.
///
/// Every step applies due injections, solves the hydraulic network, exchanges species across
/// membranes, advects species along channels and records a snapshot.
pub struct Simulation {
    config: SimulationConfig,
    state: SimulationState,
    network: Option<Network>,
    fluids: FluidRegistry,
    continuous_phase: Option<FluidId>,
    injections: Vec<MixtureInjection>,
    injection_applied: Vec<bool>,
    model: Box<dyn MembraneModel>,
    transport: TransportState,
    results: SimulationResults,
    time: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::with_config(SimulationConfig::default())
    }
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ChipError> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: SimulationConfig) -> Self {
        Self {
            model: config.membrane_model.build(),
            config,
            state: SimulationState::Uninitialized,
            network: None,
            fluids: FluidRegistry::new(),
            continuous_phase: None,
            injections: Vec::new(),
            injection_applied: Vec::new(),
            transport: TransportState::default(),
            results: SimulationResults::new(),
            time: 0.,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replaces the configuration. This also selects the membrane model named by the config.
    pub fn set_config(&mut self, config: SimulationConfig) -> Result<(), ChipError> {
        config.validate()?;
        self.model = config.membrane_model.build();
        self.config = config;
        Ok(())
    }

    /// Uses a custom membrane resistance model
    pub fn set_membrane_model(&mut self, model: Box<dyn MembraneModel>) {
        self.model = model;
    }

    pub fn membrane_model(&self) -> &dyn MembraneModel {
        self.model.as_ref()
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Simulated time [s] reached so far
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn add_fluid(&mut self, def: FluidDef) -> Result<FluidId, ChipError> {
        self.fluids.add(def)
    }

    pub fn mix_fluids(&mut self, parts: &[(FluidId, f64)]) -> Result<FluidId, ChipError> {
        self.fluids.mix(parts)
    }

    pub fn fluid(&self, id: FluidId) -> Result<&Fluid, InvalidReference> {
        self.fluids.get(id)
    }

    pub fn set_fluid_name(&mut self, id: FluidId, name: impl Into<String>) -> Result<(), ChipError> {
        self.fluids.get_mut(id)?.set_name(name);
        Ok(())
    }

    pub fn fluids(&self) -> &FluidRegistry {
        &self.fluids
    }

    /// Sets the fluid which fills the chip before any injection
    pub fn set_continuous_phase(&mut self, fluid: FluidId) -> Result<(), ChipError> {
        self.fluids.get(fluid)?;
        self.continuous_phase = Some(fluid);
        self.state = SimulationState::Uninitialized;
        Ok(())
    }

    pub fn continuous_phase(&self) -> Option<FluidId> {
        self.continuous_phase
    }

    /// Attaches the network to simulate. Scheduled injections are kept and their pumps are
    /// checked against this network by `initialize`.
    pub fn set_network(&mut self, network: Network) {
        self.network = Some(network);
        self.results.clear();
        self.state = SimulationState::Uninitialized;
    }

    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    /// Mutable access to the network. The simulation has to be initialized again afterwards.
    pub fn network_mut(&mut self) -> Option<&mut Network> {
        self.state = SimulationState::Uninitialized;
        self.network.as_mut()
    }

    /// Schedules a fluid to be delivered by a pump starting at `start_time` [s].
    ///
    /// The latest started injection of a pump replaces earlier ones. Injections may be added
    /// before the network is attached. The pump is then checked when the network is known.
    pub fn add_mixture_injection(
        &mut self,
        fluid: FluidId,
        pump: EdgeId,
        start_time: f64,
    ) -> Result<usize, ChipError> {
        self.fluids.get(fluid)?;
        if let Some(net) = self.network.as_ref() {
            net.pump(pump)?;
        }
        check_non_negative("start_time", start_time)?;

        self.injections.push(MixtureInjection {
            fluid,
            pump,
            start_time,
        });
        self.injection_applied.push(false);
        Ok(self.injections.len() - 1)
    }

    pub fn injections(&self) -> &[MixtureInjection] {
        &self.injections
    }

    pub fn results(&self) -> &SimulationResults {
        &self.results
    }

    /// Current species concentrations of channels and organs
    pub fn transport_state(&self) -> &TransportState {
        &self.transport
    }

    /// Prepares a run: computes channel resistances for the continuous phase, validates the
    /// network and fills the chip with the continuous phase.
    pub fn initialize(&mut self) -> Result<(), ChipError> {
        if self.state == SimulationState::Running {
            return Err(ChipError::InvalidState(self.state));
        }
        self.state = SimulationState::Uninitialized;

        let continuous = self
            .continuous_phase
            .ok_or(ChipError::MissingContinuousPhase)?;
        let net = self.network.as_mut().ok_or(ChipError::MissingNetwork)?;
        let fluid = self.fluids.get(continuous)?;

        net.update_channel_resistances(fluid.viscosity());
        net.validate()?;
        for inj in &self.injections {
            net.pump(inj.pump)?;
        }

        self.transport = TransportState::filled(net, &Mixture::pure(fluid));
        self.results.clear();
        self.injection_applied.iter_mut().for_each(|a| *a = false);
        self.time = 0.;
        self.state = SimulationState::Ready;

        log::info!(
            "initialized simulation: {} nodes, {} edges, {} fluids, {} injections",
            net.node_count(),
            net.edge_count(),
            self.fluids.len(),
            self.injections.len()
        );
        Ok(())
    }

    /// Runs the simulation until the configured duration is reached.
    ///
    /// On failure the simulation ends in state Failed and keeps all snapshots recorded before
    /// the failing step.
    pub fn simulate(&mut self) -> Result<(), ChipError> {
        match self.state {
            SimulationState::Uninitialized => self.initialize()?,
            SimulationState::Ready => {}
            state => return Err(ChipError::InvalidState(state)),
        }

        self.state = SimulationState::Running;
        log::info!(
            "starting simulation: duration={}s time_step={}s model={}",
            self.config.duration,
            self.config.time_step,
            self.model.name()
        );

        match self.run() {
            Ok(steps) => {
                self.state = SimulationState::Completed;
                log::info!(
                    "simulation completed after {steps} steps at t={:.1}s",
                    self.time
                );
                Ok(())
            }
            Err(err) => {
                self.state = SimulationState::Failed;
                log::error!("simulation failed at t={:.1}s: {err}", self.time);
                Err(err)
            }
        }
    }

    fn run(&mut self) -> Result<usize, ChipError> {
        let continuous = self
            .continuous_phase
            .ok_or(ChipError::MissingContinuousPhase)?;
        let continuous = Mixture::pure(self.fluids.get(continuous)?);
        let net = self.network.as_mut().ok_or(ChipError::MissingNetwork)?;

        let solver = HydraulicSolver::new(self.config.singularity_threshold);
        let integrator = MassTransportIntegrator::new(self.model.as_ref());

        solver.solve(net)?;
        check_flow_rates(net, self.time)?;
        if let Some(min_dt) = net.minimal_time_step() {
            log::info!(
                "minimal time step {min_dt:.3}s, using {}s",
                self.config.time_step
            );
        }
        self.results
            .push(Snapshot::capture(self.time, net, &self.transport));

        let duration = self.config.duration;
        let end_tolerance = 1e-9 * duration;
        let mut steps = 0;

        while duration - self.time > end_tolerance {
            if steps >= self.config.max_iterations {
                log::warn!(
                    "stopping after {steps} steps at t={:.1}s before reaching duration {duration}s",
                    self.time
                );
                break;
            }

            let t = self.time;
            let dt = self.config.time_step.min(duration - t);
            let mut transport = self.transport.clone();

            let pump_mixtures = pump_mixtures(
                net,
                &self.fluids,
                &self.injections,
                &mut self.injection_applied,
                &continuous,
                t,
            )?;

            solver.solve(net)?;
            check_flow_rates(net, t)?;

            integrator.step(net, &self.fluids, &mut transport, t, dt)?;
            advect(net, &mut transport, &pump_mixtures, dt);

            let next = t + dt;
            transport.check_bounds(self.config.concentration_tolerance, next)?;

            self.transport = transport;
            self.time = next;
            self.results
                .push(Snapshot::capture(next, net, &self.transport));

            steps += 1;
            log::debug!("step {steps}: t={next:.1}s dt={dt}s");
        }

        Ok(steps)
    }
}

fn check_flow_rates(net: &Network, time: f64) -> Result<(), ChipError> {
    match net.edges().find(|(_, e)| !e.flow_rate().is_finite()) {
        Some((id, e)) => Err(ChipError::IntegrationInstability {
            time,
            reason: format!("flow rate {} of edge {id:?} is not finite", e.flow_rate()),
        }),
        None => Ok(()),
    }
}

/// Mixture delivered by every pump at the given time
fn pump_mixtures(
    net: &Network,
    fluids: &FluidRegistry,
    injections: &[MixtureInjection],
    applied: &mut [bool],
    continuous: &Mixture,
    time: f64,
) -> Result<BTreeMap<EdgeId, Mixture>, ChipError> {
    let mut out = BTreeMap::new();

    for (pump, _, _) in net.pumps() {
        let mut active: Option<(usize, &MixtureInjection)> = None;
        for (i, inj) in injections.iter().enumerate() {
            let later = active.is_none_or(|(_, a)| inj.start_time >= a.start_time);
            if inj.pump == pump && inj.start_time <= time && later {
                active = Some((i, inj));
            }
        }

        let mixture = match active {
            Some((i, inj)) => {
                let fluid = fluids.get(inj.fluid)?;
                if !applied[i] {
                    applied[i] = true;
                    log::info!(
                        "t={time:.1}s: pump {pump:?} starts delivering fluid '{}'",
                        fluid.name()
                    );
                }
                Mixture::pure(fluid)
            }
            None => continuous.clone(),
        };
        out.insert(pump, mixture);
    }

    Ok(out)
}
