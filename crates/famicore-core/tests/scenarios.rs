//! Whole-console scenarios exercising CPU, PPU, APU and bus together.

use famicore_core::{Bus, Console};

/// 32 KiB NROM image: `program` at $8000, reset vector at `entry`.
fn nrom_image(program: &[u8], entry: u16) -> Vec<u8> {
    let mut prg = vec![0xEA; 32 * 1024];
    prg[..program.len()].copy_from_slice(program);
    prg[0x7FFC] = (entry & 0xFF) as u8;
    prg[0x7FFD] = (entry >> 8) as u8;

    let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 2, 0, 0x00, 0x00];
    image.extend_from_slice(&[0; 8]);
    image.extend_from_slice(&prg);
    image
}

fn booted(program: &[u8]) -> Console {
    let mut console = Console::new();
    console.insert_cartridge(&nrom_image(program, 0x8000)).unwrap();
    console
}

/// Console booted with the reset vector at $0000 and `program` in RAM.
fn booted_in_ram(program: &[u8]) -> Console {
    let mut console = Console::new();
    console.insert_cartridge(&nrom_image(&[], 0x0000)).unwrap();
    for (i, &byte) in program.iter().enumerate() {
        console.bus_mut().write(i as u16, byte);
    }
    console
}

fn run_cpu_cycles(console: &mut Console, cycles: u32) {
    for _ in 0..cycles {
        console.clock();
    }
}

#[test]
fn lda_immediate_sets_zero_flag() {
    let mut console = booted(&[0xA9, 0x00]);
    // 8 reset idle cycles, then the 2-cycle LDA.
    run_cpu_cycles(&mut console, 10);
    let cpu = console.cpu();
    assert_eq!(cpu.a, 0x00);
    assert_eq!(cpu.status.bits() & 0x02, 0x02); // Z
    assert_eq!(cpu.status.bits() & 0x80, 0x00); // N
}

#[test]
fn adc_signed_overflow() {
    let mut console = booted(&[0xA9, 0x50, 0x69, 0x50]);
    run_cpu_cycles(&mut console, 12);
    let cpu = console.cpu();
    assert_eq!(cpu.a, 0xA0);
    assert_eq!(cpu.status.bits() & 0x40, 0x40); // V
    assert_eq!(cpu.status.bits() & 0x80, 0x80); // N
    assert_eq!(cpu.status.bits() & 0x01, 0x00); // C
}

#[test]
fn jsr_rts_round_trip_in_ram() {
    // JSR $0006 / LDA #$01 / BRK pad ... LDA #$07 / RTS
    let mut console = booted_in_ram(&[0x20, 0x06, 0x00, 0xA9, 0x01, 0x00, 0xA9, 0x07, 0x60]);
    // JSR(6) + LDA(2) + RTS(6) + LDA(2) after the 8 idle cycles.
    run_cpu_cycles(&mut console, 8 + 16);
    assert_eq!(console.cpu().a, 0x01);
}

#[test]
fn jmp_indirect_page_wrap() {
    let mut console = booted_in_ram(&[0x6C, 0xFF, 0x02]);
    {
        let bus = console.bus_mut();
        bus.write(0x02FF, 0x06);
        bus.write(0x0200, 0x00); // wrapped high byte, not $0300
        bus.write(0x0006, 0xA9); // LDA #$44
        bus.write(0x0007, 0x44);
    }
    run_cpu_cycles(&mut console, 8 + 5 + 2);
    assert_eq!(console.cpu().a, 0x44);
}

#[test]
fn oam_dma_copies_page_two() {
    // LDA #$02 / STA $4014
    let mut console = booted(&[0xA9, 0x02, 0x8D, 0x14, 0x40]);
    for i in 0..256u16 {
        console.bus_mut().write(0x0200 + i, i as u8);
    }
    console.bus_mut().write(0x2003, 0x00);

    // Reset idle + LDA(2), then the first STA cycle performs the copy
    // and charges the stall.
    run_cpu_cycles(&mut console, 8 + 2 + 1);
    let mut stall_cycles = 0u32;
    while console.bus().apu.stall_pending() {
        console.clock();
        stall_cycles += 1;
    }
    assert!(stall_cycles == 513 || stall_cycles == 514, "{stall_cycles}");

    for i in 0..16u8 {
        console.bus_mut().write(0x2003, i);
        let expected = if i % 4 == 2 { i & 0xE3 } else { i };
        assert_eq!(console.bus_mut().read(0x2004), expected);
    }
}

#[test]
fn ppu_status_read_mixes_open_bus_and_clears_latch() {
    let mut console = booted(&[]);
    // Run a whole frame so the post-reset write protection releases,
    // then into the next vblank.
    while console.bus().ppu.frame_count() == 0 {
        console.clock();
    }
    while console.bus().ppu.status_bits() & 0x80 == 0 {
        console.clock();
    }

    // Latch $12 on the PPU side with a harmless register write.
    console.bus_mut().write(0x2003, 0x12);
    let status = console.bus_mut().read(0x2002);
    assert_eq!(status, 0x92);

    // Second read: vblank cleared.
    let status = console.bus_mut().read(0x2002);
    assert_eq!(status & 0x80, 0x00);

    // The shared write toggle was reset: a fresh $2006 pair lands.
    console.bus_mut().write(0x2006, 0x3F);
    console.bus_mut().write(0x2006, 0x00);
    console.bus_mut().write(0x2007, 0x15);
    console.bus_mut().write(0x2006, 0x3F);
    console.bus_mut().write(0x2006, 0x00);
    assert_eq!(console.bus_mut().read(0x2007) & 0x3F, 0x15);
}

#[test]
fn frame_irq_sets_and_status_read_acknowledges() {
    let mut console = booted(&[]);
    // One four-step frame-counter period with IRQ uninhibited.
    for _ in 0..15100 {
        console.clock();
    }
    assert_eq!(console.bus_mut().read(0x4015) & 0x40, 0x40);
    // Acknowledged by the read.
    assert_eq!(console.bus_mut().read(0x4015) & 0x40, 0x00);
}

#[test]
fn frame_irq_inhibit_clears_pending() {
    let mut console = booted(&[]);
    // Let the four-step frame complete with IRQ enabled.
    for _ in 0..15000 {
        console.clock();
    }
    assert!(console.bus().apu.irq_pending());

    // Set the inhibit bit; the flag clears on the next APU cycle.
    console.bus_mut().write(0x4017, 0x40);
    console.clock();
    assert!(!console.bus().apu.irq_pending());
}

#[test]
fn controller_shift_through_the_bus() {
    let mut console = booted(&[]);
    console.set_controller(0, 0b1100_0011);
    console.bus_mut().write(0x4016, 1);
    console.bus_mut().write(0x4016, 0);

    let mut value = 0u8;
    for bit in 0..8 {
        value |= (console.bus_mut().read(0x4016) & 1) << bit;
    }
    assert_eq!(value, 0b1100_0011);
    assert_eq!(console.bus_mut().read(0x4016) & 1, 1);
}

#[test]
fn mmc1_banking_through_the_bus() {
    // MMC1 image: 8 PRG banks, distinct fill per bank.
    let mut image = vec![0x4E, 0x45, 0x53, 0x1A, 8, 0, 0x10, 0x00];
    image.extend_from_slice(&[0; 8]);
    for bank in 0..8u8 {
        let mut data = vec![bank; 16 * 1024];
        if bank == 7 {
            // Reset vector in the fixed last bank.
            data[0x3FFC] = 0x00;
            data[0x3FFD] = 0x80;
        }
        image.extend_from_slice(&data);
    }

    let mut console = Console::new();
    console.insert_cartridge(&image).unwrap();

    // Serial-write control = fix-last, then PRG bank 2.
    let control = 0x0C;
    for i in 0..5 {
        console.bus_mut().write(0x8000, (control >> i) & 1);
    }
    let bank = 0x02;
    for i in 0..5 {
        console.bus_mut().write(0xE000, (bank >> i) & 1);
    }

    assert_eq!(console.bus_mut().read(0x8000), 2);
    assert_eq!(console.bus_mut().read(0xC000), 7);

    // An interrupted sequence plus bit-7 reset leaves the next sequence
    // clean.
    console.bus_mut().write(0x8000, 1);
    console.bus_mut().write(0x8000, 0x80);
    let bank = 0x03;
    for i in 0..5 {
        console.bus_mut().write(0xE000, (bank >> i) & 1);
    }
    assert_eq!(console.bus_mut().read(0x8000), 3);
}

#[test]
fn reset_keeps_cartridge_and_revectors() {
    let mut console = booted(&[0xA9, 0x33]);
    run_cpu_cycles(&mut console, 10);
    assert_eq!(console.cpu().a, 0x33);

    console.reset();
    assert_eq!(console.cpu().pc, 0x8000);
    assert_eq!(console.cpu().a, 0x00);
    assert!(console.cartridge_present());
}
