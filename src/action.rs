#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    CycleSort,
    ToggleReverse,
    ToggleKernelThreads,
    ToggleHelp,
    Refresh,
    None,
}
