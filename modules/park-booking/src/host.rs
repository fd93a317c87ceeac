// Browser-side effects the controllers cannot perform on page state alone.
//
// The hosting environment (a wasm shim, a headless driver, the test
// recorder) implements `PageHost`; controllers never touch globals.

/// Side effects owned by the page's host environment.
pub trait PageHost: Send + Sync {
    /// Blocking notice to the user.
    fn alert(&self, message: &str);

    /// Blocking yes/no question. Destructive admin actions only proceed on `true`.
    fn confirm(&self, message: &str) -> bool;

    /// Leave the current page.
    fn navigate(&self, url: &str);

    /// Ask the calendar widget to call its event source again.
    fn refetch_calendar(&self) {}
}
