use std::env;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Parses the named environment variable, falling back to `default` when
/// it isn't set. Panics if it's set but can't be parsed.
pub fn get_parsed_variable<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("parse {} environment variable", name)),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::get_parsed_variable;

    #[test]
    fn unset_variables_use_the_default() {
        let seconds: u32 = get_parsed_variable("UPLOADER_TEST_UNSET_VARIABLE", 3600);

        assert_eq!(seconds, 3600);
    }
}
