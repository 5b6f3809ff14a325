//! Event name vocabulary
//!
//! Event names are simulator-version dependent, so they are kept as data
//! rather than as an enum. The vocabulary only feeds diagnostics: an event
//! outside it still decodes normally.

use std::collections::HashSet;

/// Event names published for the current simulator release
pub const DEFAULT_EVENTS: &[&str] = &[
    "BaleDamage",
    "BarrelCollision",
    "BlindedOtherDrivers",
    "BlueLightsDisabled",
    "BlueLightsEnabled",
    "BorrowedFuel",
    "BuildingMaterialCollision",
    "CargoDelivered",
    "ChainInAir",
    "ConeCollisions",
    "CurbCollision",
    "DamageToProperty",
    "DrivingWithOpenDoors",
    "DrivingWithSupportLegs",
    "DroppedPipe",
    "DumpTruckDamage",
    "EncounterWildlife",
    "ExcessiveSpeeding",
    "ForgotTurnIndicator",
    "GoodDistanceToFire",
    "GoodDistanceToSmoke",
    "GoodsCollision",
    "InspectionMisjudgement",
    "InspectionPoints",
    "InspectionWrongOrder",
    "LeaveMaze",
    "LeftExerciseArea",
    "LeftTheTrailerBehind",
    "LiftedLoadTooHigh",
    "LogsFacingCabin",
    "LooseCargo",
    "MinorCollision",
    "MissedStation",
    "MissionsCompleted",
    "MolestedWildlife",
    "MotorcadeDistance",
    "MotorcadePositioning",
    "MotorcadeRPM",
    "MoveBall",
    "MovePole",
    "MovedToolUnlocked",
    "NoSupportLegs",
    "NotSupportedClaw",
    "ObstacleCourseTouch",
    "ObstacleMoved",
    "ObstructedTraffic",
    "PalletMoved",
    "PeopleCollision",
    "PerfectPlacement",
    "RanStopSign",
    "RedLightPenalty",
    "Roadkill",
    "RoughDriving",
    "RpmWarning",
    "Speeding",
    "SpeedingWarning",
    "TooCloseToFire",
    "TooCloseToSmoke",
    "ToolCollision",
    "UsingParkBrakeWhileDriving",
    "VehicleDamage",
    "VehicleOffroad",
    "VehicleTilt_Flipped",
    "WheelInAir",
    "WheelOffroad",
];

/// Set of event names the monitor recognizes
#[derive(Debug, Clone)]
pub struct EventVocabulary {
    names: HashSet<String>,
}

impl EventVocabulary {
    /// Vocabulary made of exactly `names`
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Default vocabulary extended with additional names
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self::default();
        vocabulary.names.extend(extra.into_iter().map(Into::into));
        vocabulary
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for EventVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_EVENTS.iter().copied())
    }
}
