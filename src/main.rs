use atomic_replace::ReplaceError;
use atomic_replace::output as out;

mod app;
mod logging;

fn main() {
    let args = atomic_replace::cli::parse();
    if let Err(e) = app::run(args) {
        out::print_error(&format!("{e}"));
        let code = e.downcast_ref::<ReplaceError>().map_or(1, ReplaceError::code);
        std::process::exit(code);
    }
}
