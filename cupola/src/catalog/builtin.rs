//! Built-in ISS Cupola image catalog.

macro_rules! drive {
    ($id:literal) => {
        concat!("https://drive.google.com/uc?export=download&id=", $id)
    };
}

/// Window name and ordered image URLs, one entry per cupola window.
pub(super) const CUPOLA_WINDOWS: &[(&str, &[&str])] = &[
    (
        "Window 0",
        &[
            drive!("1pfF3bDvlDouq0r6pNnLcXHwcU3piPCru"),
            drive!("1K8o7djvEmIBdz4at7iv3Sbs5ukN2wi9L"),
            drive!("1apFAc1ye7-2nVnS7tPjc57Rd6qMTMKr8"),
            drive!("1qe48ivsfLsvGZi5eE3e0PKcSM9Eu5re7"),
            drive!("1d1zD3-mF9c5QLAS0yMK_keb6DXxT_BDn"),
        ],
    ),
    (
        "Window 1",
        &[
            drive!("1aTPf80gcjwutNh-AelhoARhNGDN3QaKg"),
            drive!("15g5dNuz7OGlaE--dEeXTGxjS6AdX25Sg"),
            drive!("1wZhf-uknETMyPb4_mgOg9reLVXZtSPC5"),
            drive!("1I8GenxSDJ-41NRCuENjXD3mt1i6hMEuy"),
            drive!("1A1hjEv5MBOd2yD2OqptSzwr-T_7dn63u"),
        ],
    ),
    (
        "Window 2",
        &[
            drive!("1aTPf80gcjwutNh-AelhoARhNGDN3QaKg"),
            drive!("1Kh1sCO0WF6NkhsLeJB55Pp8c6Oax77VJ"),
            drive!("1djwHw8aCj6xUNS4RC6zxXPKhko7KiWAZ"),
            drive!("106KpUBeYFBVJmLIWnBfTWCgNxP6w7cne"),
            drive!("1sOgvQpjOcxQl_zvaowLW3i3amxlgH0Ts"),
        ],
    ),
    (
        "Window 3",
        &[
            drive!("1K8o7djvEmIBdz4at7iv3Sbs5ukN2wi9L"),
            drive!("12zCqc-y_t9zti6Vz0eZu5awYIEmVq3v9"),
            drive!("1x3lqnMhlUQDJeHr3hzuOSXkf-qPfgGC3"),
            drive!("1KQL7qKNClmg1edGAkGm5m44g4R0gmDBu"),
            drive!("1gG-uj42zOsj-G4L7GTztSBumKKWZ_jLR"),
        ],
    ),
    (
        "Window 4",
        &[
            drive!("1pfF3bDvlDouq0r6pNnLcXHwcU3piPCru"),
            drive!("16ckndM4z3iQ6S9f31kel6j4rBz-GFpJC"),
            drive!("1UGHEATWSiyfXiWH-s5_0hD4vSn7U4Z0M"),
            drive!("1A5SXNiqOwlzRe18e5MZuYMZtkGcsXIB8"),
            drive!("1SqRRYREYPAcIL33r9pbBz9S31JAIXfY-"),
        ],
    ),
    (
        "Window 5",
        &[
            drive!("1SMqMSQR_enzXFp_mA4CHeqKCZlWhDKaN"),
            drive!("1_AM4gbGlZtL_j_MjRqrh0qtTkPQ1kna3"),
            drive!("1L8-NEsrqRFgQkncoCHCVCaQW7HhAnc8i"),
            drive!("15qcxHZ_hXtoMqEFFRRWD37g092SfFRYA"),
        ],
    ),
    (
        "Window 6",
        &[
            drive!("1E9-ZsqXMtZL3b_rJa_LOWua2aTKrjf3K"),
            drive!("10ILjbLn2cZUtTUwWGbN1IG7Srtv1GoVO"),
            drive!("1SJttmNLmfZXE7SbtJ8G4-DqRH8X8Bn-f"),
            drive!("1AbwhVL7uEUd9zHhlE3GUeqaG7A9ciYUy"),
        ],
    ),
];
