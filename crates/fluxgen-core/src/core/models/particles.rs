use phf::{Map, phf_map};

pub static PARTICLE_NAMES: Map<i32, &'static str> = phf_map! {
    // --- Leptons ---
    11i32 => "e-",
    -11i32 => "e+",
    12i32 => "nu_e",
    -12i32 => "nu_e_bar",
    13i32 => "mu-",
    -13i32 => "mu+",
    14i32 => "nu_mu",
    -14i32 => "nu_mu_bar",
    15i32 => "tau-",
    -15i32 => "tau+",
    16i32 => "nu_tau",
    -16i32 => "nu_tau_bar",

    // --- Light mesons ---
    111i32 => "pi0",
    211i32 => "pi+",
    -211i32 => "pi-",
    130i32 => "K0L",
    310i32 => "K0S",
    321i32 => "K+",
    -321i32 => "K-",

    // --- Charmed hadrons ---
    411i32 => "D+",
    -411i32 => "D-",
    421i32 => "D0",
    -421i32 => "D0_bar",
    431i32 => "Ds+",
    -431i32 => "Ds-",
    4122i32 => "Lambda_c+",

    // --- Nucleons ---
    2212i32 => "p",
    -2212i32 => "p_bar",
    2112i32 => "n",
    -2112i32 => "n_bar",
};
