//! `clawker version`.

use crate::errors::CliError;
use crate::factory::Factory;

/// Print version and build information to Out.
pub fn run(factory: &Factory) -> Result<(), CliError> {
    factory.ios().out().write_line(&format!(
        "clawker version {} ({})",
        factory.app_version(),
        env!("CLAWKER_BUILD_DATE")
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iostreams::IoStreams;
    use std::sync::Arc;

    #[test]
    fn test_version_goes_to_out() {
        let (ios, handles) = IoStreams::test();
        let factory = Factory::test(Arc::new(ios));
        run(&factory).unwrap();
        assert!(handles.out_string().starts_with("clawker version 0.0.0-dev ("));
        assert_eq!(handles.err_string(), "");
    }
}
