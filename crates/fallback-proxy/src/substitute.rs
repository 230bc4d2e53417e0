//! Substitute user records served when the upstream origin is unreachable.
//!
//! The records mirror the shape of the upstream `/users` resource so callers
//! can keep parsing the response the same way. Passwords are plaintext
//! fixture values, not credentials.

use bytes::Bytes;
use lazy_static::lazy_static;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubstituteUser {
    pub id: u32,
    pub email: &'static str,
    pub username: &'static str,
    pub password: &'static str,
    pub name: PersonName,
    pub address: Address,
    pub phone: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PersonName {
    pub firstname: &'static str,
    pub lastname: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Address {
    pub city: &'static str,
    pub street: &'static str,
    pub number: u32,
    pub zipcode: &'static str,
    pub geolocation: Geolocation,
}

/// Coordinates are kept as strings, matching the upstream payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geolocation {
    pub lat: &'static str,
    pub long: &'static str,
}

pub static SUBSTITUTE_USERS: [SubstituteUser; 2] = [
    SubstituteUser {
        id: 1,
        email: "john@gmail.com",
        username: "johndoe",
        password: "m38rmF$",
        name: PersonName {
            firstname: "john",
            lastname: "doe",
        },
        address: Address {
            city: "kilcoole",
            street: "7835 new road",
            number: 3,
            zipcode: "12926-3874",
            geolocation: Geolocation {
                lat: "-37.3159",
                long: "81.1496",
            },
        },
        phone: "1-570-236-7033",
    },
    SubstituteUser {
        id: 2,
        email: "morrison@gmail.com",
        username: "mor_2314",
        password: "83r5^_",
        name: PersonName {
            firstname: "david",
            lastname: "morrison",
        },
        address: Address {
            city: "Cullman",
            street: "Lovers Ln",
            number: 7267,
            zipcode: "29576-7874",
            geolocation: Geolocation {
                lat: "40.3467",
                long: "-30.1310",
            },
        },
        phone: "1-853-854-6666",
    },
];

lazy_static! {
    static ref SUBSTITUTE_BODY: Bytes = Bytes::from(
        serde_json::to_vec(&SUBSTITUTE_USERS).expect("substitute users are plain data")
    );
}

/// JSON encoding of [`SUBSTITUTE_USERS`], serialized once.
pub fn substitute_body() -> Bytes {
    SUBSTITUTE_BODY.clone()
}
