pub mod state;

pub fn increment(x: usize, len: usize, wrap: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if x >= len - 1 {
        if wrap { 0 } else { len - 1 }
    } else {
        x + 1
    }
}

pub fn decrement(x: usize, len: usize, wrap: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if x == 0 {
        if wrap { len - 1 } else { 0 }
    } else {
        x - 1
    }
}
