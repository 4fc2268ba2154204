fn main() {
    table_tracker::cli::run();
}
