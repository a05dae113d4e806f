//! Channel-indexed storage.
//!
//! Every per-image quantity in the engine exists once per color channel.
//! [`Channels`] keeps the three values together so that equal-length and
//! equal-dimension invariants can be checked in one place.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Number of color channels processed by the engine.
pub const CHANNEL_COUNT: usize = 3;

/// One color component of an RGB image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in interleaved storage order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Position of this channel inside an interleaved pixel.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// One value per channel, indexed by [`Channel`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channels<T>([T; CHANNEL_COUNT]);

impl<T> Channels<T> {
    pub fn new(red: T, green: T, blue: T) -> Self {
        Self([red, green, blue])
    }

    pub fn from_fn(mut f: impl FnMut(Channel) -> T) -> Self {
        Self([f(Channel::Red), f(Channel::Green), f(Channel::Blue)])
    }

    /// Builds all three values, stopping at the first failure.
    ///
    /// Values created before the failure are dropped before the error is
    /// returned, so partially acquired resources are released.
    pub fn try_from_fn<E>(mut f: impl FnMut(Channel) -> Result<T, E>) -> Result<Self, E> {
        let red = f(Channel::Red)?;
        let green = f(Channel::Green)?;
        let blue = f(Channel::Blue)?;
        Ok(Self([red, green, blue]))
    }

    pub fn map<U>(self, mut f: impl FnMut(Channel, T) -> U) -> Channels<U> {
        let [red, green, blue] = self.0;
        Channels([
            f(Channel::Red, red),
            f(Channel::Green, green),
            f(Channel::Blue, blue),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &T)> {
        Channel::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Channel, &mut T)> {
        Channel::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn values(&self) -> &[T; CHANNEL_COUNT] {
        &self.0
    }

    pub fn into_values(self) -> [T; CHANNEL_COUNT] {
        self.0
    }
}

impl<T> Index<Channel> for Channels<T> {
    type Output = T;

    fn index(&self, channel: Channel) -> &T {
        &self.0[channel.index()]
    }
}

impl<T> IndexMut<Channel> for Channels<T> {
    fn index_mut(&mut self, channel: Channel) -> &mut T {
        &mut self.0[channel.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_fn_stops_at_first_error() {
        let mut visited = Vec::new();
        let result: Result<Channels<u8>, Channel> = Channels::try_from_fn(|channel| {
            visited.push(channel);
            if channel == Channel::Green {
                Err(channel)
            } else {
                Ok(1)
            }
        });

        assert_eq!(result.unwrap_err(), Channel::Green);
        assert_eq!(visited, vec![Channel::Red, Channel::Green]);
    }

    #[test]
    fn test_index_matches_interleaved_order() {
        let channels = Channels::new('r', 'g', 'b');
        assert_eq!(channels[Channel::Red], 'r');
        assert_eq!(channels[Channel::Green], 'g');
        assert_eq!(channels[Channel::Blue], 'b');
        for (channel, value) in channels.iter() {
            assert_eq!(channels.values()[channel.index()], *value);
        }
    }
}
