fn main() {
    if let Err(e) = fluid_particles::core::Runner::run() {
        eprintln!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}
