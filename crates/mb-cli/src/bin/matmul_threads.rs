fn main() -> eyre::Result<()> {
    mb_cli::logging::init();
    mb_cli::run_benchmark::<mb_cli::ThreadArgs>(std::env::args_os())
}
