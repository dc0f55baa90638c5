macro_rules! setup {
    ($fixture:ident) => {
        let _ = env_logger::builder().is_test(true).try_init();
        let $fixture = Fixture::new(false);
    };
    ($fixture:ident, managed) => {
        let _ = env_logger::builder().is_test(true).try_init();
        let $fixture = Fixture::new(true);
    };
}

mod fixture;
mod tests;
