/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// is_compatible reports whether `current` satisfies the `minimum` version.
//
// Versions are dot-separated integers of any length. The shorter one is
// padded with zeros and components are compared left to right; the first
// component that differs decides. A component that is not a non-negative
// integer counts as 0.
pub fn is_compatible(minimum: &str, current: &str) -> bool {
    let minimum = components(minimum);
    let current = components(current);

    for i in 0..minimum.len().max(current.len()) {
        let have = current.get(i).copied().unwrap_or(0);
        let need = minimum.get(i).copied().unwrap_or(0);
        if have != need {
            return have > need;
        }
    }
    true
}

fn components(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}
