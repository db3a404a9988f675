use chipsim::{
    ChannelKind, FluidDef, FluidRegistry, HydraulicSolver, MassTransportIntegrator, Mixture,
    Network, TopologyError, TransportState,
    models::{MembraneModel, PermeabilityModel, PoreGeometryModel, PoreResistanceModel},
};
use gems::{DENSITY_MEDIUM, DIFFUSIVITY_SMALL_MOLECULE, VISCOSITY_MEDIUM};

fn drug() -> FluidDef {
    FluidDef {
        name: "drug".into(),
        viscosity: VISCOSITY_MEDIUM,
        density: DENSITY_MEDIUM,
        diffusivity: DIFFUSIVITY_SMALL_MOLECULE,
        concentration: 1.,
    }
}

#[test]
fn test_membrane_models_are_deterministic_and_positive() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    let c = net
        .add_channel(a, b, 0.3e-3, 5e-3, 8e-3, ChannelKind::Normal)
        .unwrap();

    let mut fluids = FluidRegistry::new();
    let id = fluids.add(drug()).unwrap();
    let fluid = fluids.get(id).unwrap();

    let models: [&dyn MembraneModel; 3] =
        [&PoreGeometryModel, &PoreResistanceModel, &PermeabilityModel];

    for (radius, porosity) in [(10e-6, 0.14), (0.2e-6, 0.01), (5e-6, 1.)] {
        let m = net
            .add_membrane_to_channel(c, 55e-6, 4e-3, radius, porosity)
            .unwrap();
        let membrane = net.membrane(m).unwrap();
        for model in models {
            let r1 = model.membrane_resistance(membrane, fluid, membrane.area());
            let r2 = model.membrane_resistance(membrane, fluid, membrane.area());
            assert_eq!(r1, r2, "{} model", model.name());
            assert!(r1 > 0. && r1.is_finite(), "{} model: {r1}", model.name());
        }
    }
}

#[test]
fn test_rk4_step_accuracy() {
    let mut net = Network::new();
    let a = net.add_node();
    let b = net.add_node();
    let c = net
        .add_channel(a, b, 0.3e-3, 5e-3, 8e-3, ChannelKind::Normal)
        .unwrap();
    let m = net
        .add_membrane_to_channel(c, 55e-6, 4e-3, 10e-6, 0.14)
        .unwrap();
    let membrane = net.membrane(m).unwrap();

    // permeability p = 1 / R = 1
    let (r, delta0, horizon) = (1., 0.6, 1.);
    let error = |steps: usize| {
        let dt = horizon / steps as f64;
        let mut delta = delta0;
        for i in 0..steps {
            delta += membrane.concentration_change(r, dt, delta, i as f64 * dt);
        }
        (delta - delta0 * horizon.exp()).abs()
    };

    // single step error is O(dt^5)
    let dt: f64 = 0.1;
    let single = membrane.concentration_change(r, dt, delta0, 0.);
    assert!((delta0 + single - delta0 * dt.exp()).abs() < delta0 * dt.powi(5));

    let ratio = error(10) / error(20);
    assert!(ratio > 12. && ratio < 20., "ratio={ratio}");
}

#[test]
fn test_membrane_step_conserves_mass() {
    let mut net = Network::new();
    let g = net.add_node();
    let n = net.add_node();
    net.add_flow_rate_pump(g, n, 5.5e-8).unwrap();
    let c = net
        .add_channel(n, g, 0.3e-3, 5e-3, 8e-3, ChannelKind::Normal)
        .unwrap();
    let m = net
        .add_membrane_to_channel(c, 55e-6, 4e-3, 10e-6, 0.14)
        .unwrap();
    let o = net.add_organ_to_membrane(m, 13e-3, 1.5e-6 / (13e-3 * 8e-3)).unwrap();
    net.set_ground(g).unwrap();
    HydraulicSolver::default().solve(&mut net).unwrap();

    let mut fluids = FluidRegistry::new();
    let id = fluids.add(drug()).unwrap();

    let mut state = TransportState::default();
    state.channels.insert(c, Mixture::from_iter([(id, 0.9)]));
    state.organs.insert(o, Mixture::from_iter([(id, 0.1)]));
    let before = state.clone();

    let model = PermeabilityModel;
    let exchanges = MassTransportIntegrator::new(&model)
        .step(&net, &fluids, &mut state, 0., 30.)
        .unwrap();
    assert_eq!(exchanges.len(), 1);
    let ex = &exchanges[0];

    let removed = (before.channel(c).unwrap().concentration(id)
        - state.channel(c).unwrap().concentration(id))
        * ex.channel_volume;
    let added = (state.organ(o).unwrap().concentration(id)
        - before.organ(o).unwrap().concentration(id))
        * ex.organ_volume;
    assert!(removed > 0.);
    approx::assert_relative_eq!(removed, added, max_relative = 1e-6);
}

#[test]
fn test_topology_rejection() {
    let build = || {
        let mut net = Network::new();
        let g = net.add_node();
        let n = net.add_node();
        net.add_flow_rate_pump(g, n, 1e-9).unwrap();
        net.add_channel(n, g, 0.3e-3, 5e-3, 8e-3, ChannelKind::Normal)
            .unwrap();
        net.set_ground(g).unwrap();
        (net, n)
    };

    let (net, _) = build();
    assert!(net.is_valid());

    let (mut net, n) = build();
    net.set_ground(n).unwrap();
    assert!(!net.is_valid());
    assert_eq!(net.validate(), Err(TopologyError::MultipleGrounds(2)));

    let (mut net, _) = build();
    let orphan = net.add_node();
    assert!(!net.is_valid());
    assert_eq!(net.validate(), Err(TopologyError::Unreachable(orphan)));
}
