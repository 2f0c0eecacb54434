//! clw - runs the clw binary for this platform, installing it first if needed

fn main() {
    clw_cli::init_tracing();

    let args: Vec<_> = std::env::args_os().skip(1).collect();
    let code = clw_cli::launch::run(&args);
    std::process::exit(code);
}
