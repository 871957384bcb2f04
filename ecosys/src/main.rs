fn main() -> anyhow::Result<()> {
    ecosys::run_cli()
}
