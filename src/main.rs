fn main() {
    if let Err(err) = seating_rs_planner::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
