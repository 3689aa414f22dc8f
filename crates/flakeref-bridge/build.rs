//! Build script for the optional libnix backend
//!
//! Without the `nix` feature nothing is compiled or linked.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    #[cfg(feature = "nix")]
    nix::build();
}

#[cfg(feature = "nix")]
mod nix {
    const NIX_LIBRARIES: &[&str] = &["nix-main", "nix-cmd", "nix-expr", "nix-store"];

    pub fn build() {
        println!("cargo:rerun-if-changed=include/nix_flakeref.h");
        println!("cargo:rerun-if-changed=src/nix_flakeref.cpp");
        println!("cargo:rerun-if-changed=src/nix.rs");

        let mut include_paths = Vec::new();
        for name in NIX_LIBRARIES {
            let library = pkg_config::probe_library(name).unwrap_or_else(|e| {
                panic!("pkg-config could not find {name}; is Nix installed with development headers? {e}")
            });
            include_paths.extend(library.include_paths);
        }

        cxx_build::bridge("src/nix.rs")
            .file("src/nix_flakeref.cpp")
            .flag_if_supported("-std=c++2a")
            .includes(&include_paths)
            .compile("flakeref_bridge_nix");

        // parseFlakeRef pulls in the fetchers, which have no pkg-config file of their own
        println!("cargo:rustc-link-lib=nixfetchers");
    }
}
