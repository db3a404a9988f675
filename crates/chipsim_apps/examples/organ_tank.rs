use chipsim::{SimulationConfig, print_last_state};
use chipsim_apps::OrganTank;
use gems::{time_from_hours, time_to_hours};

/// Runs the organ tank chip for 24 hours.
///
/// Optionally takes the path to a JSON file with a simulation config as first argument.
fn main() -> eyre::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let data = std::fs::read_to_string(&path)?;
            serde_json::from_str::<SimulationConfig>(&data)?
        }
        None => SimulationConfig::default(),
    };
    log::info!("config: {}", serde_json::to_string(&config)?);

    let mut chip = OrganTank::new(config)?;
    chip.simulation.simulate()?;

    let Some(net) = chip.simulation.network() else {
        eyre::bail!("simulation lost its network");
    };
    print_last_state(net, chip.simulation.fluids(), chip.simulation.results());

    println!(">> Organ concentrations:");
    println!("  {:>8} {:>10} {:>10}", "t [h]", "Organ 1", "Organ 2");
    let duration = chip.simulation.config().duration;
    let mut hour = 0.;
    while time_from_hours(hour) <= duration {
        let t = time_from_hours(hour);
        println!(
            "  {:>8.1} {:>10.4} {:>10.4}",
            time_to_hours(t),
            chip.organ_concentration(0, t).unwrap_or(f64::NAN),
            chip.organ_concentration(1, t).unwrap_or(f64::NAN),
        );
        hour += 3.;
    }

    if let Some(last) = chip.simulation.results().last_state() {
        println!("{}", serde_json::to_string_pretty(last)?);
    }

    Ok(())
}
