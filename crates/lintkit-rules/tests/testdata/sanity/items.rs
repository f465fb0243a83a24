//! A bit of everything, so checkers meet unusual syntax at least once.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::{Arc, Mutex};

pub const LIMIT: usize = 16;
static NAMES: &[&str] = &["a", "b"];

pub type Table<K> = HashMap<K, Vec<u8>>;

#[derive(Debug, Clone, Default)]
pub struct Point<T: Copy = i32> {
    pub x: T,
    pub y: T,
}

pub enum Shape {
    Circle { r: f64 },
    Rect(f64, f64),
    Empty,
}

pub trait Area {
    fn area(&self) -> f64;

    fn describe(&self) -> String {
        format!("area {:.2}", self.area())
    }
}

impl Area for Shape {
    fn area(&self) -> f64 {
        match *self {
            Shape::Circle { r } => std::f64::consts::PI * r * r,
            Shape::Rect(w, h) if w > 0.0 => w * h,
            Shape::Rect(..) | Shape::Empty => 0.0,
        }
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

pub struct Cache<'a> {
    inner: Arc<Mutex<HashMap<&'a str, usize>>>,
}

impl<'a> Cache<'a> {
    pub fn get_or_insert(&self, key: &'a str, make: impl FnOnce() -> usize) -> Option<usize> {
        let mut map = self.inner.lock().ok()?;
        Some(*map.entry(key).or_insert_with(make))
    }
}

pub async fn pipeline(input: Vec<u32>) -> Result<u32, String> {
    let doubled: Vec<u32> = input.iter().map(|x| x * 2).collect();
    let total = async move { doubled.into_iter().sum::<u32>() }.await;
    if total > 1000 {
        return Err(format!("too large: {total}"));
    }
    let _ = NAMES.len();
    Ok(total)
}

macro_rules! square {
    ($e:expr) => {
        $e * $e
    };
}

pub fn uses_macro(v: i32) -> i32 {
    let closure = |a: i32, b: i32| -> i32 { a + b };
    let mut acc = 0;
    for i in 0..v {
        acc = closure(acc, square!(i));
    }
    'outer: loop {
        while acc > 0 {
            acc -= 1;
            if acc % 7 == 0 {
                break 'outer;
            }
        }
        break;
    }
    acc
}

mod nested {
    pub(crate) mod deeper {
        pub fn id<T>(t: T) -> T
        where
            T: Clone,
        {
            t
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn works() {
        assert_eq!(nested::deeper::id(3), 3);
        assert_eq!(uses_macro(0), 0);
    }
}
