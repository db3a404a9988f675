use crate::{EdgeKind, FluidRegistry, Network, SimulationResults, Snapshot};
use gems::{flow_to_micro_liters_per_minute, time_to_hours, volume_to_micro_liters};

pub fn print_node_overview(net: &Network, snapshot: &Snapshot) {
    println!(">> Nodes:");
    println!("  {:<6} {:>8} {:>14}", "ID", "Role", "Pressure [Pa]");
    println!("{}", "-".repeat(6 + 8 + 14 + 4));

    for (id, node) in net.nodes() {
        let role = match (node.is_ground(), node.is_sink()) {
            (true, true) => "gnd+sink",
            (true, false) => "ground",
            (false, true) => "sink",
            (false, false) => "",
        };
        println!(
            "  {:<6} {:>8} {:>14.3}",
            *id,
            role,
            snapshot.pressure(id).unwrap_or(f64::NAN)
        );
    }
}

pub fn print_edge_overview(net: &Network, snapshot: &Snapshot) {
    println!(">> Edges:");
    println!(
        "  {:<6} {:>14} {:>6} {:>6} {:>16} {:>14} {:>12}",
        "ID", "Type", "Node0", "Node1", "Flow [uL/min]", "R [Pa s/m3]", "Volume [uL]"
    );
    println!("{}", "-".repeat(6 + 14 + 6 * 2 + 16 + 14 + 12 + 8));

    for (id, edge) in net.edges() {
        let volume = match edge.kind() {
            EdgeKind::Channel(c) => volume_to_micro_liters(c.volume()),
            EdgeKind::Membrane(m) => volume_to_micro_liters(m.volume()),
            EdgeKind::Organ(o) => volume_to_micro_liters(o.volume()),
            EdgeKind::Pump(_) => f64::NAN,
        };
        println!(
            "  {:<6} {:>14} {:>6} {:>6} {:>16.4} {:>14.4e} {:>12.4}",
            *id,
            edge.type_name(),
            *edge.node0(),
            *edge.node1(),
            flow_to_micro_liters_per_minute(snapshot.flow_rate(id).unwrap_or(f64::NAN)),
            edge.resistance().unwrap_or(f64::NAN),
            volume,
        );
    }
}

/// Concentration of every species in every channel and organ
pub fn print_concentration_overview(net: &Network, fluids: &FluidRegistry, snapshot: &Snapshot) {
    println!(">> Concentrations:");
    print!("  {:<6} {:>10}", "ID", "Type");
    for fluid in fluids.iter() {
        print!(" {:>12}", fluid.name());
    }
    println!();
    println!("{}", "-".repeat(6 + 10 + 13 * fluids.len() + 3));

    for (id, mixture) in snapshot.concentrations.iter() {
        let kind = net.edge(*id).map(|e| e.type_name()).unwrap_or("N/A");
        print!("  {:<6} {:>10}", **id, kind);
        for fluid in fluids.iter() {
            print!(" {:>12.6}", mixture.concentration(fluid.id()));
        }
        println!();
    }
}

/// Prints the last recorded state of a simulation run
pub fn print_last_state(net: &Network, fluids: &FluidRegistry, results: &SimulationResults) {
    let Some(snapshot) = results.last_state() else {
        println!("No simulation results.");
        return;
    };

    println!(
        "State at t={:.3} h after {} snapshots",
        time_to_hours(snapshot.time),
        results.len()
    );
    print_node_overview(net, snapshot);
    print_edge_overview(net, snapshot);
    print_concentration_overview(net, fluids, snapshot);
}
