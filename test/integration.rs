// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{arg, stderr, stdout, DotcfgFixture};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs::{create_dir_all, read};

#[test]
fn wallpapers_add_list_extract() -> Result<()> {
    let fixture = DotcfgFixture::new()?;
    let bg = fixture.file("bg.png", "png1")?;
    let sky = fixture.file("photos/sky.JPG", "jpg1")?;

    let output = fixture.dotcfg(["wallpapers", "add", arg(&bg)])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Successfully added 'bg.png' to wallpapers archive\n");

    let output = fixture.dotcfg(["wallpapers", "add", arg(&sky)])?;
    assert!(output.status.success(), "{}", stderr(&output));

    let output = fixture.dotcfg(["wallpapers", "list"])?;
    assert!(output.status.success(), "{}", stderr(&output));
    let expect = indoc! {"
        Wallpapers in archive (2):
          - bg.png
          - sky.JPG
    "};
    assert_eq!(stdout(&output), expect);

    let out_dir = fixture.path().join("out");
    let output = fixture.dotcfg(["wallpapers", "extract", arg(&out_dir)])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!("Extracted 2 wallpaper(s) to {}\n", out_dir.join("wallpapers").display())
    );
    assert_eq!(read(out_dir.join("wallpapers").join("bg.png"))?, b"png1");
    assert_eq!(read(out_dir.join("wallpapers").join("sky.JPG"))?, b"jpg1");

    Ok(())
}

#[test]
fn wallpapers_extract_counts_files_on_disk() -> Result<()> {
    let fixture = DotcfgFixture::new()?;
    let bg = fixture.file("bg.png", "png1")?;
    let output = fixture.dotcfg(["wallpapers", "add", arg(&bg)])?;
    assert!(output.status.success(), "{}", stderr(&output));

    let out_dir = fixture.path().join("out");
    fixture.file("out/wallpapers/old.png", "old")?;
    create_dir_all(out_dir.join("wallpapers").join("nested"))?;

    let output = fixture.dotcfg(["wallpapers", "extract", arg(&out_dir)])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(
        stdout(&output),
        format!("Extracted 2 wallpaper(s) to {}\n", out_dir.join("wallpapers").display())
    );

    Ok(())
}

#[test]
fn wallpapers_add_duplicate_needs_force() -> Result<()> {
    let fixture = DotcfgFixture::new()?;
    let bg = fixture.file("bg.png", "png1")?;

    let output = fixture.dotcfg(["wallpapers", "add", arg(&bg)])?;
    assert!(output.status.success(), "{}", stderr(&output));

    let output = fixture.dotcfg(["wallpapers", "add", arg(&bg)])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--force"));

    fixture.file("bg.png", "png2")?;
    let output = fixture.dotcfg(["wallpapers", "add", "--force", arg(&bg)])?;
    assert!(output.status.success(), "{}", stderr(&output));

    let out_dir = fixture.path().join("out");
    let output = fixture.dotcfg(["wallpapers", "extract", arg(&out_dir)])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(read(out_dir.join("wallpapers").join("bg.png"))?, b"png2");

    Ok(())
}

#[test]
fn wallpapers_add_rejects_non_images_unless_asked() -> Result<()> {
    let fixture = DotcfgFixture::new()?;
    let doc = fixture.file("notes.txt", "text")?;

    let output = fixture.dotcfg(["wallpapers", "add", arg(&doc)])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(!fixture.archive().exists());

    let output = fixture.dotcfg([
        "wallpapers",
        "add",
        "--no-validate",
        arg(&doc),
    ])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(fixture.archive().exists());

    Ok(())
}

#[test]
fn wallpapers_list_missing_archive_fails() -> Result<()> {
    let fixture = DotcfgFixture::new()?;

    let output = fixture.dotcfg(["wallpapers", "list"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());

    Ok(())
}

#[test]
fn icon_templates_list_show_copy() -> Result<()> {
    let fixture = DotcfgFixture::new()?;
    fixture.file("icons/apps/firefox.svg", "svg1")?;
    fixture.file("icons/apps/term.svg", "svg2")?;
    fixture.file("icons/places/home.svg", "svg3")?;
    fixture.file("icons/places/.hidden.svg", "svg4")?;

    let output = fixture.dotcfg(["icon-templates", "list", "-c", "places"])?;
    assert!(output.status.success(), "{}", stderr(&output));
    let expect = indoc! {"
        Icons in 'places':
          - home.svg
        Total: 1 icon(s)
    "};
    assert_eq!(stdout(&output), expect);

    let output = fixture.dotcfg(["icon-templates", "show", "term.svg"])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Category:  apps"));

    let target = fixture.path().join("copied");
    let output = fixture.dotcfg([
        "icon-templates",
        "copy",
        arg(&target),
        "-i",
        "firefox.svg,home.svg",
    ])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(read(target.join("firefox.svg"))?, b"svg1");
    assert_eq!(read(target.join("home.svg"))?, b"svg3");
    assert!(!target.join("term.svg").exists());

    let output = fixture.dotcfg(["icon-templates", "show", "nope.svg"])?;
    assert_eq!(output.status.code(), Some(1));

    Ok(())
}

#[test]
fn icon_templates_missing_data_dir_fails() -> Result<()> {
    let fixture = DotcfgFixture::new()?;

    let output = fixture.dotcfg(["icon-templates", "list"])?;
    assert_eq!(output.status.code(), Some(1));

    create_dir_all(fixture.icons_dir())?;
    let output = fixture.dotcfg(["icon-templates", "list"])?;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "No categories found\n");

    Ok(())
}

#[test]
fn packages_list_roles() -> Result<()> {
    let fixture = DotcfgFixture::new()?;
    let playbook = fixture.playbook();
    fixture.file(
        &playbook,
        indoc! {"
            - hosts: localhost
              roles:
                - common
                - role: nvim
                  tags: [nvim, editor]
        "},
    )?;

    let output = fixture.dotcfg(["packages", "list"])?;
    assert!(output.status.success(), "{}", stderr(&output));
    let result = stdout(&output);
    assert!(result.contains("common"));
    assert!(result.contains("[no tags]"));
    assert!(result.contains("[nvim, editor]"));
    assert!(result.contains("Total: 2 role(s)"));

    Ok(())
}

#[test]
fn packages_list_missing_playbook_fails() -> Result<()> {
    let fixture = DotcfgFixture::new()?;

    let output = fixture.dotcfg(["packages", "list"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("playbook not found"));

    Ok(())
}
