fn main() {
    csv_plot::cli::run();
}
