fn main() -> anyhow::Result<()> {
    pgvault::cli::run()
}
