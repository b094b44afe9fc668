fn main() {
    tunnel_reorder::cli::run();
}
