fn main() -> eyre::Result<()> {
    mb_cli::logging::init();
    mb_cli::run_compare(std::env::args_os())
}
