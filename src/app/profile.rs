//! Actuator profiles: the garage-door and light variants.
//!
//! A [`Profile`] fixes the state enumerations, which target is the Rest
//! position, how a target settles into a current state, and which
//! characteristics change when it does.  The state machine is generic
//! over the profile, so the door and the light share one implementation.
//!
//! Wire values are the protocol's `u8` characteristic values.  Enum
//! declaration order matches them, so the postcard encoding of the
//! persisted record uses the same numbers.

use core::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::notify::{CharacteristicId, ServiceId};
use crate::error::Error;

/// Bounds shared by every state enumeration.
pub trait StateValue:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Into<u8> + TryFrom<u8, Error = Error> + Send
{
}

impl<T> StateValue for T where
    T: Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Into<u8> + TryFrom<u8, Error = Error> + Send
{
}

pub trait Profile: Copy + Eq + fmt::Debug + Send + 'static {
    type Current: StateValue;
    type Target: StateValue;

    /// Human-readable name used in log lines.
    const NAME: &'static str;

    /// Service carrying the state characteristics.
    const SERVICE: ServiceId;
    const CURRENT_CHARACTERISTIC: CharacteristicId;
    const TARGET_CHARACTERISTIC: CharacteristicId;

    /// The Rest target (Closed / Off).  Needs no timer.
    const REST: Self::Target;

    /// Whether `target` is the Active position that starts the revert
    /// countdown.
    fn is_active(target: Self::Target) -> bool;

    /// Settled current state for a target.  This device class settles
    /// immediately; transitional values are never produced.
    fn settle(target: Self::Target) -> Self::Current;

    /// Physical output level implied by a target.
    fn level(target: Self::Target) -> bool {
        Self::is_active(target)
    }
}

// ---------------------------------------------------------------------------
// Garage door
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CurrentDoorState {
    Open = 0,
    Closed = 1,
    Opening = 2,
    Closing = 3,
    Stopped = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TargetDoorState {
    Open = 0,
    Closed = 1,
}

impl From<CurrentDoorState> for u8 {
    fn from(s: CurrentDoorState) -> u8 {
        s as u8
    }
}

impl TryFrom<u8> for CurrentDoorState {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(Self::Open),
            1 => Ok(Self::Closed),
            2 => Ok(Self::Opening),
            3 => Ok(Self::Closing),
            4 => Ok(Self::Stopped),
            _ => Err(Error::InvalidValue(v)),
        }
    }
}

impl From<TargetDoorState> for u8 {
    fn from(s: TargetDoorState) -> u8 {
        s as u8
    }
}

impl TryFrom<u8> for TargetDoorState {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(Self::Open),
            1 => Ok(Self::Closed),
            _ => Err(Error::InvalidValue(v)),
        }
    }
}

/// Garage Door Opener service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GarageDoor;

impl Profile for GarageDoor {
    type Current = CurrentDoorState;
    type Target = TargetDoorState;

    const NAME: &'static str = "garage door";

    const SERVICE: ServiceId = ServiceId(0x30);
    const CURRENT_CHARACTERISTIC: CharacteristicId = CharacteristicId(0x32);
    const TARGET_CHARACTERISTIC: CharacteristicId = CharacteristicId(0x33);

    const REST: TargetDoorState = TargetDoorState::Closed;

    fn is_active(target: TargetDoorState) -> bool {
        target == TargetDoorState::Open
    }

    fn settle(target: TargetDoorState) -> CurrentDoorState {
        match target {
            TargetDoorState::Open => CurrentDoorState::Open,
            TargetDoorState::Closed => CurrentDoorState::Closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Light
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LightState {
    Off = 0,
    On = 1,
}

impl From<LightState> for u8 {
    fn from(s: LightState) -> u8 {
        s as u8
    }
}

impl TryFrom<u8> for LightState {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self, Error> {
        match v {
            0 => Ok(Self::Off),
            1 => Ok(Self::On),
            _ => Err(Error::InvalidValue(v)),
        }
    }
}

/// Light Bulb service.  The single `On` characteristic serves as both
/// current and target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lightbulb;

impl Profile for Lightbulb {
    type Current = LightState;
    type Target = LightState;

    const NAME: &'static str = "light";

    const SERVICE: ServiceId = ServiceId(0x30);
    const CURRENT_CHARACTERISTIC: CharacteristicId = CharacteristicId(0x33);
    const TARGET_CHARACTERISTIC: CharacteristicId = CharacteristicId(0x33);

    const REST: LightState = LightState::Off;

    fn is_active(target: LightState) -> bool {
        target == LightState::On
    }

    fn settle(target: LightState) -> LightState {
        target
    }
}
