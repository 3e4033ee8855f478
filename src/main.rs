use flightqc::error::{EXIT_FAILURE, PipelineError};

fn main() {
    if let Err(err) = flightqc::run() {
        eprintln!("error: {err}");
        let code = err
            .downcast_ref::<PipelineError>()
            .map_or(EXIT_FAILURE, PipelineError::exit_code);
        std::process::exit(code);
    }
}
