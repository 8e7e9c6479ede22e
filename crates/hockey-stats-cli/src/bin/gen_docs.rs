//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", hockey_stats_cli::render_options_markdown());
}
