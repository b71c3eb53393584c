// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: BSD-2-Clause-Patent

use crate::crypto::rand::{self, RandImpl};
use ring::rand::{SecureRandom, SystemRandom};

fn get_random(buf: &mut [u8]) -> bool {
    SystemRandom::new().fill(buf).is_ok()
}

pub fn register() {
    rand::register(RandImpl {
        get_random_cb: get_random,
    });
}
