use msys2_metadata::{vercmp, Component, Desc, References, Srcinfo};

const SRCINFO: &str = "\
pkgbase = mingw-w64-libarchive
\tpkgdesc = Multi-format archive and compression library (mingw-w64)
\tpkgver = 3.7.4
\tpkgrel = 1
\turl = https://libarchive.org/
\tarch = any
\tlicense = spdx:BSD-2-Clause
\tdepends = mingw-w64-x86_64-bzip2
\tdepends = mingw-w64-x86_64-zstd
pkgname = mingw-w64-x86_64-libarchive
";

const DESC: &str = "\
%FILENAME%
mingw-w64-x86_64-libarchive-3.7.2-1-any.pkg.tar.zst

%NAME%
mingw-w64-x86_64-libarchive

%VERSION%
3.7.2-1
";

fn main() {
    let srcinfo = Srcinfo::parse(SRCINFO).expect("failed to parse srcinfo");

    println!("=== Parsed SRCINFO ===");
    println!("pkgbase:      {}", srcinfo.pkgbase().unwrap_or("-"));
    println!("pkgver:       {}", srcinfo.pkgver().unwrap_or("-"));
    for (name, record) in &srcinfo.packages {
        println!("package:      {name}");
        for (key, values) in record {
            println!("  {key:<12}{}", values.join(" "));
        }
    }

    let refs = References::parse(["cpe: cpe:2.3:a:libarchive:libarchive"]);
    let components =
        Component::from_srcinfo(&srcinfo, &refs).expect("failed to derive components");

    println!("\n=== Components ===");
    for component in &components {
        println!(
            "{} {} {}",
            component.name,
            component.version,
            component.cpe.as_deref().unwrap_or("-")
        );
    }

    let desc = Desc::parse(DESC);
    let repo_version = desc.first("%VERSION%").unwrap_or("0");
    let local_version = format!(
        "{}-{}",
        srcinfo.pkgver().unwrap_or("0"),
        srcinfo.base["pkgrel"].join("")
    );

    println!("\n=== Freshness ===");
    println!(
        "repo {repo_version} vs srcinfo {local_version}: {:?}",
        vercmp(repo_version, &local_version)
    );
}
