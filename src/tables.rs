//! Symbolic lookup tables.
//!
//! Maps small integer codes found in ELF headers and DWARF entries to their
//! symbolic name and a short description. Unknown codes resolve to empty
//! strings; vendor extensions are expected to show up that way.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};

/// One `code -> (name, description)` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub code: u64,
    pub name: &'static str,
    pub description: &'static str,
}

impl Entry {
    pub const fn new(code: u64, name: &'static str, description: &'static str) -> Self {
        Self { code, name, description }
    }
}

/// Immutable code table.
///
/// When two rows share a code the first one wins, so aliases listed later
/// (e.g. `DT_ENCODING` after `DT_PREINIT_ARRAY`) never shadow the primary name.
#[derive(Debug, Clone)]
pub struct LookupTable {
    entries: Vec<Entry>,
    by_code: HashMap<u64, usize>,
}

impl LookupTable {
    pub fn new(rows: impl IntoIterator<Item = Entry>) -> Self {
        let mut entries = Vec::new();
        let mut by_code = HashMap::new();
        for entry in rows {
            by_code.entry(entry.code).or_insert(entries.len());
            entries.push(entry);
        }
        Self { entries, by_code }
    }

    fn from_static(rows: &[(u64, &'static str, &'static str)]) -> Self {
        Self::new(rows.iter().map(|&(code, name, description)| Entry::new(code, name, description)))
    }

    /// Name and description for `code`, or two empty strings.
    pub fn resolve(&self, code: u64) -> (&'static str, &'static str) {
        self.by_code
            .get(&code)
            .map(|&i| (self.entries[i].name, self.entries[i].description))
            .unwrap_or(("", ""))
    }

    pub fn name(&self, code: u64) -> &'static str {
        self.resolve(code).0
    }

    /// Names of every entry whose value shares a bit with `bitmask`.
    ///
    /// Bits without an entry are dropped silently.
    pub fn resolve_flags(&self, bitmask: u64) -> BTreeSet<&'static str> {
        self.entries
            .iter()
            .filter(|entry| entry.code & bitmask != 0)
            .map(|entry| entry.name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

macro_rules! elf_table {
    ($(#[$meta:meta])* $table:ident, [$(($code:expr, $name:literal, $desc:literal)),* $(,)?]) => {
        $(#[$meta])*
        pub static $table: Lazy<LookupTable> =
            Lazy::new(|| LookupTable::from_static(&[$(($code, $name, $desc)),*]));
    };
}

macro_rules! dwarf_table {
    ($(#[$meta:meta])* $table:ident, [$($constant:ident),* $(,)?]) => {
        $(#[$meta])*
        pub static $table: Lazy<LookupTable> = Lazy::new(|| {
            LookupTable::new([$(Entry::new(
                u64::from(gimli::constants::$constant.0),
                stringify!($constant),
                "",
            )),*])
        });
    };
}

elf_table!(
    /// `EI_CLASS`
    ELF_CLASS,
    [
        (0, "ELFCLASSNONE", "Invalid class"),
        (1, "ELFCLASS32", "32-bit objects"),
        (2, "ELFCLASS64", "64-bit objects"),
    ]
);

elf_table!(
    /// `EI_DATA`
    ELF_DATA,
    [
        (0, "ELFDATANONE", "Invalid data encoding"),
        (1, "ELFDATA2LSB", "2's complement, little endian"),
        (2, "ELFDATA2MSB", "2's complement, big endian"),
    ]
);

elf_table!(
    /// `EI_OSABI`
    ELF_OSABI,
    [
        (0, "ELFOSABI_SYSV", "UNIX System V ABI"),
        (1, "ELFOSABI_HPUX", "HP-UX"),
        (2, "ELFOSABI_NETBSD", "NetBSD"),
        (3, "ELFOSABI_GNU", "Object uses GNU ELF extensions"),
        (6, "ELFOSABI_SOLARIS", "Sun Solaris"),
        (7, "ELFOSABI_AIX", "IBM AIX"),
        (8, "ELFOSABI_IRIX", "SGI Irix"),
        (9, "ELFOSABI_FREEBSD", "FreeBSD"),
        (10, "ELFOSABI_TRU64", "Compaq TRU64 UNIX"),
        (11, "ELFOSABI_MODESTO", "Novell Modesto"),
        (12, "ELFOSABI_OPENBSD", "OpenBSD"),
        (64, "ELFOSABI_ARM_AEABI", "ARM EABI"),
        (97, "ELFOSABI_ARM", "ARM"),
        (255, "ELFOSABI_STANDALONE", "Standalone (embedded) application"),
    ]
);

elf_table!(
    /// `e_type`
    ELF_TYPE,
    [
        (0, "ET_NONE", "No file type"),
        (1, "ET_REL", "Relocatable file"),
        (2, "ET_EXEC", "Executable file"),
        (3, "ET_DYN", "Shared object file"),
        (4, "ET_CORE", "Core file"),
    ]
);

elf_table!(
    /// `e_machine`
    ELF_MACHINE,
    [
        (0, "EM_NONE", "No machine"),
        (1, "EM_M32", "AT&T WE 32100"),
        (2, "EM_SPARC", "SUN SPARC"),
        (3, "EM_386", "Intel 80386"),
        (4, "EM_68K", "Motorola m68k family"),
        (5, "EM_88K", "Motorola m88k family"),
        (6, "EM_IAMCU", "Intel MCU"),
        (7, "EM_860", "Intel 80860"),
        (8, "EM_MIPS", "MIPS R3000 big-endian"),
        (9, "EM_S370", "IBM System/370"),
        (10, "EM_MIPS_RS3_LE", "MIPS R3000 little-endian"),
        (15, "EM_PARISC", "HPPA"),
        (17, "EM_VPP500", "Fujitsu VPP500"),
        (18, "EM_SPARC32PLUS", "Sun's v8plus"),
        (19, "EM_960", "Intel 80960"),
        (20, "EM_PPC", "PowerPC"),
        (21, "EM_PPC64", "PowerPC 64-bit"),
        (22, "EM_S390", "IBM S390"),
        (23, "EM_SPU", "IBM SPU/SPC"),
        (36, "EM_V800", "NEC V800 series"),
        (37, "EM_FR20", "Fujitsu FR20"),
        (38, "EM_RH32", "TRW RH-32"),
        (39, "EM_RCE", "Motorola RCE"),
        (40, "EM_ARM", "ARM"),
        (41, "EM_FAKE_ALPHA", "Digital Alpha"),
        (42, "EM_SH", "Hitachi SH"),
        (43, "EM_SPARCV9", "SPARC v9 64-bit"),
        (44, "EM_TRICORE", "Siemens Tricore"),
        (45, "EM_ARC", "Argonaut RISC Core"),
        (46, "EM_H8_300", "Hitachi H8/300"),
        (47, "EM_H8_300H", "Hitachi H8/300H"),
        (48, "EM_H8S", "Hitachi H8S"),
        (49, "EM_H8_500", "Hitachi H8/500"),
        (50, "EM_IA_64", "Intel Merced"),
        (51, "EM_MIPS_X", "Stanford MIPS-X"),
        (52, "EM_COLDFIRE", "Motorola Coldfire"),
        (53, "EM_68HC12", "Motorola M68HC12"),
        (54, "EM_MMA", "Fujitsu MMA Multimedia Accelerator"),
        (55, "EM_PCP", "Siemens PCP"),
        (56, "EM_NCPU", "Sony nCPU embedded RISC"),
        (57, "EM_NDR1", "Denso NDR1 microprocessor"),
        (58, "EM_STARCORE", "Motorola Start*Core processor"),
        (59, "EM_ME16", "Toyota ME16 processor"),
        (60, "EM_ST100", "STMicroelectronic ST100 processor"),
        (61, "EM_TINYJ", "Advanced Logic Corp. Tinyj emb.fam"),
        (62, "EM_X86_64", "AMD x86-64 architecture"),
        (63, "EM_PDSP", "Sony DSP Processor"),
        (64, "EM_PDP10", "Digital PDP-10"),
        (65, "EM_PDP11", "Digital PDP-11"),
        (66, "EM_FX66", "Siemens FX66 microcontroller"),
        (67, "EM_ST9PLUS", "STMicroelectronics ST9+ 8/16 mc"),
        (68, "EM_ST7", "STmicroelectronics ST7 8 bit mc"),
        (69, "EM_68HC16", "Motorola MC68HC16 microcontroller"),
        (70, "EM_68HC11", "Motorola MC68HC11 microcontroller"),
        (71, "EM_68HC08", "Motorola MC68HC08 microcontroller"),
        (72, "EM_68HC05", "Motorola MC68HC05 microcontroller"),
        (73, "EM_SVX", "Silicon Graphics SVx"),
        (74, "EM_ST19", "STMicroelectronics ST19 8 bit mc"),
        (75, "EM_VAX", "Digital VAX"),
        (76, "EM_CRIS", "Axis Communications 32-bit emb.proc"),
        (77, "EM_JAVELIN", "Infineon Technologies 32-bit emb.proc"),
        (78, "EM_FIREPATH", "Element 14 64-bit DSP Processor"),
        (79, "EM_ZSP", "LSI Logic 16-bit DSP Processor"),
        (80, "EM_MMIX", "Donald Knuth's educational 64-bit proc"),
        (81, "EM_HUANY", "Harvard University machine-independent object files"),
        (82, "EM_PRISM", "SiTera Prism"),
        (83, "EM_AVR", "Atmel AVR 8-bit microcontroller"),
        (84, "EM_FR30", "Fujitsu FR30"),
        (85, "EM_D10V", "Mitsubishi D10V"),
        (86, "EM_D30V", "Mitsubishi D30V"),
        (87, "EM_V850", "NEC v850"),
        (88, "EM_M32R", "Mitsubishi M32R"),
        (89, "EM_MN10300", "Matsushita MN10300"),
        (90, "EM_MN10200", "Matsushita MN10200"),
        (91, "EM_PJ", "picoJava"),
        (92, "EM_OPENRISC", "OpenRISC 32-bit embedded processor"),
        (93, "EM_ARC_COMPACT", "ARC International ARCompact"),
        (94, "EM_XTENSA", "Tensilica Xtensa Architecture"),
        (95, "EM_VIDEOCORE", "Alphamosaic VideoCore"),
        (96, "EM_TMM_GPP", "Thompson Multimedia General Purpose Proc"),
        (97, "EM_NS32K", "National Semi. 32000"),
        (98, "EM_TPC", "Tenor Network TPC"),
        (99, "EM_SNP1K", "Trebia SNP 1000"),
        (100, "EM_ST200", "STMicroelectronics ST200"),
        (101, "EM_IP2K", "Ubicom IP2xxx"),
        (102, "EM_MAX", "MAX processor"),
        (103, "EM_CR", "National Semi. CompactRISC"),
        (104, "EM_F2MC16", "Fujitsu F2MC16"),
        (105, "EM_MSP430", "Texas Instruments msp430"),
        (106, "EM_BLACKFIN", "Analog Devices Blackfin DSP"),
        (107, "EM_SE_C33", "Seiko Epson S1C33 family"),
        (108, "EM_SEP", "Sharp embedded microprocessor"),
        (109, "EM_ARCA", "Arca RISC"),
        (110, "EM_UNICORE", "PKU-Unity & MPRC Peking Uni. mc series"),
        (111, "EM_EXCESS", "eXcess configurable cpu"),
        (112, "EM_DXP", "Icera Semi. Deep Execution Processor"),
        (113, "EM_ALTERA_NIOS2", "Altera Nios II"),
        (114, "EM_CRX", "National Semi. CompactRISC CRX"),
        (115, "EM_XGATE", "Motorola XGATE"),
        (116, "EM_C166", "Infineon C16x/XC16x"),
        (117, "EM_M16C", "Renesas M16C"),
        (118, "EM_DSPIC30F", "Microchip Technology dsPIC30F"),
        (119, "EM_CE", "Freescale Communication Engine RISC"),
        (120, "EM_M32C", "Renesas M32C"),
        (131, "EM_TSK3000", "Altium TSK3000"),
        (132, "EM_RS08", "Freescale RS08"),
        (133, "EM_SHARC", "Analog Devices SHARC family"),
        (134, "EM_ECOG2", "Cyan Technology eCOG2"),
        (135, "EM_SCORE7", "Sunplus S+core7 RISC"),
        (136, "EM_DSP24", "New Japan Radio (NJR) 24-bit DSP"),
        (137, "EM_VIDEOCORE3", "Broadcom VideoCore III"),
        (138, "EM_LATTICEMICO32", "RISC for Lattice FPGA"),
        (139, "EM_SE_C17", "Seiko Epson C17"),
        (140, "EM_TI_C6000", "Texas Instruments TMS320C6000 DSP"),
        (141, "EM_TI_C2000", "Texas Instruments TMS320C2000 DSP"),
        (142, "EM_TI_C5500", "Texas Instruments TMS320C55x DSP"),
        (143, "EM_TI_ARP32", "Texas Instruments App. Specific RISC"),
        (144, "EM_TI_PRU", "Texas Instruments Prog. Realtime Unit"),
        (160, "EM_MMDSP_PLUS", "STMicroelectronics 64bit VLIW DSP"),
        (161, "EM_CYPRESS_M8C", "Cypress M8C"),
        (162, "EM_R32C", "Renesas R32C"),
        (163, "EM_TRIMEDIA", "NXP Semi. TriMedia"),
        (164, "EM_QDSP6", "QUALCOMM DSP6"),
        (165, "EM_8051", "Intel 8051 and variants"),
        (166, "EM_STXP7X", "STMicroelectronics STxP7x"),
        (167, "EM_NDS32", "Andes Tech. compact code emb. RISC"),
        (168, "EM_ECOG1X", "Cyan Technology eCOG1X"),
        (169, "EM_MAXQ30", "Dallas Semi. MAXQ30 mc"),
        (170, "EM_XIMO16", "New Japan Radio (NJR) 16-bit DSP"),
        (171, "EM_MANIK", "M2000 Reconfigurable RISC"),
        (172, "EM_CRAYNV2", "Cray NV2 vector architecture"),
        (173, "EM_RX", "Renesas RX"),
        (174, "EM_METAG", "Imagination Tech. META"),
        (175, "EM_MCST_ELBRUS", "MCST Elbrus"),
        (176, "EM_ECOG16", "Cyan Technology eCOG16"),
        (177, "EM_CR16", "National Semi. CompactRISC CR16"),
        (178, "EM_ETPU", "Freescale Extended Time Processing Unit"),
        (179, "EM_SLE9X", "Infineon Tech. SLE9X"),
        (180, "EM_L10M", "Intel L10M"),
        (181, "EM_K10M", "Intel K10M"),
        (183, "EM_AARCH64", "ARM AARCH64"),
        (185, "EM_AVR32", "Amtel 32-bit microprocessor"),
        (186, "EM_STM8", "STMicroelectronics STM8"),
        (187, "EM_TILE64", "Tilera TILE64"),
        (188, "EM_TILEPRO", "Tilera TILEPro"),
        (189, "EM_MICROBLAZE", "Xilinx MicroBlaze"),
        (190, "EM_CUDA", "NVIDIA CUDA"),
        (191, "EM_TILEGX", "Tilera TILE-Gx"),
        (192, "EM_CLOUDSHIELD", "CloudShield"),
        (193, "EM_COREA_1ST", "KIPO-KAIST Core-A 1st gen."),
        (194, "EM_COREA_2ND", "KIPO-KAIST Core-A 2nd gen."),
        (195, "EM_ARCV2", "Synopsys ARCv2 ISA"),
        (196, "EM_OPEN8", "Open8 RISC"),
        (197, "EM_RL78", "Renesas RL78"),
        (198, "EM_VIDEOCORE5", "Broadcom VideoCore V"),
        (199, "EM_78KOR", "Renesas 78KOR"),
        (200, "EM_56800EX", "Freescale 56800EX DSC"),
        (201, "EM_BA1", "Beyond BA1"),
        (202, "EM_BA2", "Beyond BA2"),
        (203, "EM_XCORE", "XMOS xCORE"),
        (204, "EM_MCHP_PIC", "Microchip 8-bit PIC(r)"),
        (205, "EM_INTELGT", "Intel Graphics Technology"),
        (210, "EM_KM32", "KM211 KM32"),
        (211, "EM_KMX32", "KM211 KMX32"),
        (212, "EM_EMX16", "KM211 KMX16"),
        (213, "EM_EMX8", "KM211 KMX8"),
        (214, "EM_KVARC", "KM211 KVARC"),
        (215, "EM_CDP", "Paneve CDP"),
        (216, "EM_COGE", "Cognitive Smart Memory Processor"),
        (217, "EM_COOL", "Bluechip CoolEngine"),
        (218, "EM_NORC", "Nanoradio Optimized RISC"),
        (219, "EM_CSR_KALIMBA", "CSR Kalimba"),
        (220, "EM_Z80", "Zilog Z80"),
        (221, "EM_VISIUM", "Controls and Data Services VISIUMcore"),
        (222, "EM_FT32", "FTDI Chip FT32"),
        (223, "EM_MOXIE", "Moxie processor"),
        (224, "EM_AMDGPU", "AMD GPU"),
        (243, "EM_RISCV", "RISC-V"),
        (247, "EM_BPF", "Linux BPF -- in-kernel virtual machine"),
        (252, "EM_CSKY", "C-SKY"),
        (258, "EM_LOONGARCH", "LoongArch"),
    ]
);

elf_table!(
    /// `p_type`
    SEGMENT_TYPE,
    [
        (0, "PT_NULL", "Program header table entry unused"),
        (1, "PT_LOAD", "Loadable program segment"),
        (2, "PT_DYNAMIC", "Dynamic linking information"),
        (3, "PT_INTERP", "Program interpreter"),
        (4, "PT_NOTE", "Auxiliary information"),
        (5, "PT_SHLIB", "Reserved"),
        (6, "PT_PHDR", "Entry for header table itself"),
        (7, "PT_TLS", "Thread-local storage segment"),
        (0x6474_e550, "PT_GNU_EH_FRAME", "GCC .eh_frame_hdr segment"),
        (0x6474_e551, "PT_GNU_STACK", "Indicates stack executability"),
        (0x6474_e552, "PT_GNU_RELRO", "Read-only after relocation"),
        (0x6474_e553, "PT_GNU_PROPERTY", "GNU property notes"),
    ]
);

elf_table!(
    /// `p_flags`
    SEGMENT_FLAGS,
    [
        (0x1, "PF_X", "Segment is executable"),
        (0x2, "PF_W", "Segment is writable"),
        (0x4, "PF_R", "Segment is readable"),
    ]
);

elf_table!(
    /// `sh_type`
    SECTION_TYPE,
    [
        (0, "SHT_NULL", "Section header table entry unused"),
        (1, "SHT_PROGBITS", "Program data"),
        (2, "SHT_SYMTAB", "Symbol table"),
        (3, "SHT_STRTAB", "String table"),
        (4, "SHT_RELA", "Relocation entries with addends"),
        (5, "SHT_HASH", "Symbol hash table"),
        (6, "SHT_DYNAMIC", "Dynamic linking information"),
        (7, "SHT_NOTE", "Notes"),
        (8, "SHT_NOBITS", "Program space with no data (bss)"),
        (9, "SHT_REL", "Relocation entries, no addends"),
        (10, "SHT_SHLIB", "Reserved"),
        (11, "SHT_DYNSYM", "Dynamic linker symbol table"),
        (14, "SHT_INIT_ARRAY", "Array of constructors"),
        (15, "SHT_FINI_ARRAY", "Array of destructors"),
        (16, "SHT_PREINIT_ARRAY", "Array of pre-constructors"),
        (17, "SHT_GROUP", "Section group"),
        (18, "SHT_SYMTAB_SHNDX", "Extended section indices"),
        (19, "SHT_RELR", "RELR relative relocations"),
        (0x6fff_fff5, "SHT_GNU_ATTRIBUTES", "Object attributes"),
        (0x6fff_fff6, "SHT_GNU_HASH", "GNU-style hash table"),
        (0x6fff_fff7, "SHT_GNU_LIBLIST", "Prelink library list"),
        (0x6fff_fffd, "SHT_GNU_VERDEF", "Version definition section"),
        (0x6fff_fffe, "SHT_GNU_VERNEED", "Version needs section"),
        (0x6fff_ffff, "SHT_GNU_VERSYM", "Version symbol table"),
    ]
);

elf_table!(
    /// `sh_flags`
    SECTION_FLAGS,
    [
        (0x1, "SHF_WRITE", "Writable"),
        (0x2, "SHF_ALLOC", "Occupies memory during execution"),
        (0x4, "SHF_EXECINSTR", "Executable"),
        (0x10, "SHF_MERGE", "Might be merged"),
        (0x20, "SHF_STRINGS", "Contains nul-terminated strings"),
        (0x40, "SHF_INFO_LINK", "`sh_info' contains SHT index"),
        (0x80, "SHF_LINK_ORDER", "Preserve order after combining"),
        (0x100, "SHF_OS_NONCONFORMING", "Non-standard OS specific handling required"),
        (0x200, "SHF_GROUP", "Section is member of a group"),
        (0x400, "SHF_TLS", "Section hold thread-local data"),
        (0x800, "SHF_COMPRESSED", "Section with compressed data"),
    ]
);

elf_table!(
    /// `ST_BIND(st_info)`
    SYMBOL_BINDING,
    [
        (0, "STB_LOCAL", "Local symbol"),
        (1, "STB_GLOBAL", "Global symbol"),
        (2, "STB_WEAK", "Weak symbol"),
        (3, "STB_NUM", "Number of defined types"),
        (10, "STB_GNU_UNIQUE", "Unique symbol"),
    ]
);

elf_table!(
    /// `ST_TYPE(st_info)`
    SYMBOL_TYPE,
    [
        (0, "STT_NOTYPE", "Symbol type is unspecified"),
        (1, "STT_OBJECT", "Symbol is a data object"),
        (2, "STT_FUNC", "Symbol is a code object"),
        (3, "STT_SECTION", "Symbol associated with a section"),
        (4, "STT_FILE", "Symbol's name is file name"),
        (5, "STT_COMMON", "Symbol is a common data object"),
        (6, "STT_TLS", "Symbol is thread-local data object"),
        (7, "STT_NUM", "Number of defined types"),
        (10, "STT_GNU_IFUNC", "Symbol is indirect code object"),
    ]
);

elf_table!(
    /// `ST_VISIBILITY(st_other)`
    SYMBOL_VISIBILITY,
    [
        (0, "STV_DEFAULT", "Default symbol visibility rules"),
        (1, "STV_INTERNAL", "Processor specific hidden class"),
        (2, "STV_HIDDEN", "Sym unavailable in other modules"),
        (3, "STV_PROTECTED", "Not preemptible, not exported"),
    ]
);

elf_table!(
    /// Record kind of a data block, see [`crate::layout::BlockKind`].
    BLOCK_KIND,
    [
        (0, "ELF_T_BYTE", "unsigned char"),
        (1, "ELF_T_ADDR", "Elf32_Addr, Elf64_Addr, ..."),
        (2, "ELF_T_DYN", "Dynamic section record"),
        (4, "ELF_T_HALF", "Elf32_Half, Elf64_Half, ..."),
        (7, "ELF_T_RELA", "Relocation entry with addend"),
        (8, "ELF_T_REL", "Relocation entry"),
        (11, "ELF_T_SYM", "Symbol record"),
        (12, "ELF_T_WORD", "Elf32_Word, Elf64_Word, ..."),
        (15, "ELF_T_VDEF", "Elf32_Verdef, Elf64_Verdef, ..."),
        (17, "ELF_T_VNEED", "Elf32_Verneed, Elf64_Verneed, ..."),
        (19, "ELF_T_NHDR", "Elf32_Nhdr, Elf64_Nhdr, ..."),
        (23, "ELF_T_GNUHASH", "GNU-style hash section"),
        (25, "ELF_T_CHDR", "Compressed, Elf32_Chdr, Elf64_Chdr, ..."),
        (27, "ELF_T_RELR", "Relative relocation entry"),
    ]
);

elf_table!(
    /// `d_tag`
    DYNAMIC_TAG,
    [
        (0, "DT_NULL", "Marks end of dynamic section"),
        (1, "DT_NEEDED", "Name of needed library"),
        (2, "DT_PLTRELSZ", "Size in bytes of PLT relocs"),
        (3, "DT_PLTGOT", "Processor defined value"),
        (4, "DT_HASH", "Address of symbol hash table"),
        (5, "DT_STRTAB", "Address of string table"),
        (6, "DT_SYMTAB", "Address of symbol table"),
        (7, "DT_RELA", "Address of Rela relocs"),
        (8, "DT_RELASZ", "Total size of Rela relocs"),
        (9, "DT_RELAENT", "Size of one Rela reloc"),
        (10, "DT_STRSZ", "Size of string table"),
        (11, "DT_SYMENT", "Size of one symbol table entry"),
        (12, "DT_INIT", "Address of init function"),
        (13, "DT_FINI", "Address of termination function"),
        (14, "DT_SONAME", "Name of shared object"),
        (15, "DT_RPATH", "Library search path (deprecated)"),
        (16, "DT_SYMBOLIC", "Start symbol search here"),
        (17, "DT_REL", "Address of Rel relocs"),
        (18, "DT_RELSZ", "Total size of Rel relocs"),
        (19, "DT_RELENT", "Size of one Rel reloc"),
        (20, "DT_PLTREL", "Type of reloc in PLT"),
        (21, "DT_DEBUG", "For debugging; unspecified"),
        (22, "DT_TEXTREL", "Reloc might modify .text"),
        (23, "DT_JMPREL", "Address of PLT relocs"),
        (24, "DT_BIND_NOW", "Process relocations of object"),
        (25, "DT_INIT_ARRAY", "Array with addresses of init fct"),
        (26, "DT_FINI_ARRAY", "Array with addresses of fini fct"),
        (27, "DT_INIT_ARRAYSZ", "Size in bytes of DT_INIT_ARRAY"),
        (28, "DT_FINI_ARRAYSZ", "Size in bytes of DT_FINI_ARRAY"),
        (29, "DT_RUNPATH", "Library search path"),
        (30, "DT_FLAGS", "Flags for the object being loaded"),
        (32, "DT_PREINIT_ARRAY", "Array with addresses of preinit fct"),
        (32, "DT_ENCODING", "Start of encoded range"),
        (33, "DT_PREINIT_ARRAYSZ", "Size in bytes of DT_PREINIT_ARRAY"),
        (34, "DT_SYMTAB_SHNDX", "Address of SYMTAB_SHNDX section"),
        (35, "DT_RELRSZ", "Total size of RELR relative relocations"),
        (36, "DT_RELR", "Address of RELR relative relocations"),
        (37, "DT_RELRENT", "Size of one RELR relative relocation"),
        (0x6fff_fef5, "DT_GNU_HASH", "GNU-style hash table"),
        (0x6fff_fff0, "DT_VERSYM", "Version symbol table"),
        (0x6fff_fff9, "DT_RELACOUNT", "Number of relative Rela relocs"),
        (0x6fff_fffa, "DT_RELCOUNT", "Number of relative Rel relocs"),
        (0x6fff_fffb, "DT_FLAGS_1", "State flags"),
        (0x6fff_fffc, "DT_VERDEF", "Address of version definition table"),
        (0x6fff_fffd, "DT_VERDEFNUM", "Number of version definitions"),
        (0x6fff_fffe, "DT_VERNEED", "Address of table with needed versions"),
        (0x6fff_ffff, "DT_VERNEEDNUM", "Number of needed versions"),
    ]
);

dwarf_table!(
    /// `DW_TAG_*`
    DWARF_TAG,
    [
        DW_TAG_array_type,
        DW_TAG_class_type,
        DW_TAG_entry_point,
        DW_TAG_enumeration_type,
        DW_TAG_formal_parameter,
        DW_TAG_imported_declaration,
        DW_TAG_label,
        DW_TAG_lexical_block,
        DW_TAG_member,
        DW_TAG_pointer_type,
        DW_TAG_reference_type,
        DW_TAG_compile_unit,
        DW_TAG_string_type,
        DW_TAG_structure_type,
        DW_TAG_subroutine_type,
        DW_TAG_typedef,
        DW_TAG_union_type,
        DW_TAG_unspecified_parameters,
        DW_TAG_variant,
        DW_TAG_common_block,
        DW_TAG_common_inclusion,
        DW_TAG_inheritance,
        DW_TAG_inlined_subroutine,
        DW_TAG_module,
        DW_TAG_ptr_to_member_type,
        DW_TAG_set_type,
        DW_TAG_subrange_type,
        DW_TAG_with_stmt,
        DW_TAG_access_declaration,
        DW_TAG_base_type,
        DW_TAG_catch_block,
        DW_TAG_const_type,
        DW_TAG_constant,
        DW_TAG_enumerator,
        DW_TAG_file_type,
        DW_TAG_friend,
        DW_TAG_namelist,
        DW_TAG_namelist_item,
        DW_TAG_packed_type,
        DW_TAG_subprogram,
        DW_TAG_template_type_parameter,
        DW_TAG_template_value_parameter,
        DW_TAG_thrown_type,
        DW_TAG_try_block,
        DW_TAG_variant_part,
        DW_TAG_variable,
        DW_TAG_volatile_type,
        DW_TAG_dwarf_procedure,
        DW_TAG_restrict_type,
        DW_TAG_interface_type,
        DW_TAG_namespace,
        DW_TAG_imported_module,
        DW_TAG_unspecified_type,
        DW_TAG_partial_unit,
        DW_TAG_imported_unit,
        DW_TAG_condition,
        DW_TAG_shared_type,
        DW_TAG_type_unit,
        DW_TAG_rvalue_reference_type,
        DW_TAG_template_alias,
        DW_TAG_coarray_type,
        DW_TAG_generic_subrange,
        DW_TAG_dynamic_type,
        DW_TAG_atomic_type,
        DW_TAG_call_site,
        DW_TAG_call_site_parameter,
        DW_TAG_skeleton_unit,
        DW_TAG_immutable_type,
        DW_TAG_GNU_template_template_param,
        DW_TAG_GNU_template_parameter_pack,
        DW_TAG_GNU_formal_parameter_pack,
        DW_TAG_GNU_call_site,
        DW_TAG_GNU_call_site_parameter,
    ]
);

dwarf_table!(
    /// `DW_AT_*`
    DWARF_ATTRIBUTE,
    [
        DW_AT_sibling,
        DW_AT_location,
        DW_AT_name,
        DW_AT_ordering,
        DW_AT_byte_size,
        DW_AT_bit_offset,
        DW_AT_bit_size,
        DW_AT_stmt_list,
        DW_AT_low_pc,
        DW_AT_high_pc,
        DW_AT_language,
        DW_AT_discr,
        DW_AT_discr_value,
        DW_AT_visibility,
        DW_AT_import,
        DW_AT_string_length,
        DW_AT_common_reference,
        DW_AT_comp_dir,
        DW_AT_const_value,
        DW_AT_containing_type,
        DW_AT_default_value,
        DW_AT_inline,
        DW_AT_is_optional,
        DW_AT_lower_bound,
        DW_AT_producer,
        DW_AT_prototyped,
        DW_AT_return_addr,
        DW_AT_start_scope,
        DW_AT_bit_stride,
        DW_AT_upper_bound,
        DW_AT_abstract_origin,
        DW_AT_accessibility,
        DW_AT_address_class,
        DW_AT_artificial,
        DW_AT_base_types,
        DW_AT_calling_convention,
        DW_AT_count,
        DW_AT_data_member_location,
        DW_AT_decl_column,
        DW_AT_decl_file,
        DW_AT_decl_line,
        DW_AT_declaration,
        DW_AT_discr_list,
        DW_AT_encoding,
        DW_AT_external,
        DW_AT_frame_base,
        DW_AT_friend,
        DW_AT_identifier_case,
        DW_AT_macro_info,
        DW_AT_namelist_item,
        DW_AT_priority,
        DW_AT_segment,
        DW_AT_specification,
        DW_AT_static_link,
        DW_AT_type,
        DW_AT_use_location,
        DW_AT_variable_parameter,
        DW_AT_virtuality,
        DW_AT_vtable_elem_location,
        DW_AT_allocated,
        DW_AT_associated,
        DW_AT_data_location,
        DW_AT_byte_stride,
        DW_AT_entry_pc,
        DW_AT_use_UTF8,
        DW_AT_extension,
        DW_AT_ranges,
        DW_AT_trampoline,
        DW_AT_call_column,
        DW_AT_call_file,
        DW_AT_call_line,
        DW_AT_description,
        DW_AT_binary_scale,
        DW_AT_decimal_scale,
        DW_AT_small,
        DW_AT_decimal_sign,
        DW_AT_digit_count,
        DW_AT_picture_string,
        DW_AT_mutable,
        DW_AT_threads_scaled,
        DW_AT_explicit,
        DW_AT_object_pointer,
        DW_AT_endianity,
        DW_AT_elemental,
        DW_AT_pure,
        DW_AT_recursive,
        DW_AT_signature,
        DW_AT_main_subprogram,
        DW_AT_data_bit_offset,
        DW_AT_const_expr,
        DW_AT_enum_class,
        DW_AT_linkage_name,
        DW_AT_string_length_bit_size,
        DW_AT_string_length_byte_size,
        DW_AT_rank,
        DW_AT_str_offsets_base,
        DW_AT_addr_base,
        DW_AT_rnglists_base,
        DW_AT_dwo_name,
        DW_AT_reference,
        DW_AT_rvalue_reference,
        DW_AT_macros,
        DW_AT_call_all_calls,
        DW_AT_call_all_source_calls,
        DW_AT_call_all_tail_calls,
        DW_AT_call_return_pc,
        DW_AT_call_value,
        DW_AT_call_origin,
        DW_AT_call_parameter,
        DW_AT_call_pc,
        DW_AT_call_tail_call,
        DW_AT_call_target,
        DW_AT_call_target_clobbered,
        DW_AT_call_data_location,
        DW_AT_call_data_value,
        DW_AT_noreturn,
        DW_AT_alignment,
        DW_AT_export_symbols,
        DW_AT_deleted,
        DW_AT_defaulted,
        DW_AT_loclists_base,
        DW_AT_MIPS_linkage_name,
        DW_AT_GNU_vector,
        DW_AT_GNU_all_tail_call_sites,
        DW_AT_GNU_all_call_sites,
        DW_AT_GNU_macros,
        DW_AT_GNU_dwo_name,
        DW_AT_GNU_dwo_id,
        DW_AT_GNU_ranges_base,
        DW_AT_GNU_addr_base,
        DW_AT_GNU_pubnames,
        DW_AT_GNU_locviews,
        DW_AT_GNU_entry_view,
    ]
);

dwarf_table!(
    /// `DW_FORM_*`
    DWARF_FORM,
    [
        DW_FORM_addr,
        DW_FORM_block2,
        DW_FORM_block4,
        DW_FORM_data2,
        DW_FORM_data4,
        DW_FORM_data8,
        DW_FORM_string,
        DW_FORM_block,
        DW_FORM_block1,
        DW_FORM_data1,
        DW_FORM_flag,
        DW_FORM_sdata,
        DW_FORM_strp,
        DW_FORM_udata,
        DW_FORM_ref_addr,
        DW_FORM_ref1,
        DW_FORM_ref2,
        DW_FORM_ref4,
        DW_FORM_ref8,
        DW_FORM_ref_udata,
        DW_FORM_indirect,
        DW_FORM_sec_offset,
        DW_FORM_exprloc,
        DW_FORM_flag_present,
        DW_FORM_strx,
        DW_FORM_addrx,
        DW_FORM_ref_sup4,
        DW_FORM_strp_sup,
        DW_FORM_data16,
        DW_FORM_line_strp,
        DW_FORM_ref_sig8,
        DW_FORM_implicit_const,
        DW_FORM_loclistx,
        DW_FORM_rnglistx,
        DW_FORM_ref_sup8,
        DW_FORM_strx1,
        DW_FORM_strx2,
        DW_FORM_strx3,
        DW_FORM_strx4,
        DW_FORM_addrx1,
        DW_FORM_addrx2,
        DW_FORM_addrx3,
        DW_FORM_addrx4,
        DW_FORM_GNU_addr_index,
        DW_FORM_GNU_str_index,
        DW_FORM_GNU_ref_alt,
        DW_FORM_GNU_strp_alt,
    ]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_resolve_to_empty_strings() {
        assert_eq!(SECTION_TYPE.resolve(0x6000_1234), ("", ""));
        assert_eq!(DWARF_TAG.name(0xdead), "");
    }

    #[test]
    fn known_codes() {
        assert_eq!(ELF_MACHINE.resolve(62), ("EM_X86_64", "AMD x86-64 architecture"));
        assert_eq!(SECTION_TYPE.name(8), "SHT_NOBITS");
        assert_eq!(DWARF_TAG.name(0x2e), "DW_TAG_subprogram");
        assert_eq!(DWARF_ATTRIBUTE.name(0x47), "DW_AT_specification");
        assert_eq!(DWARF_FORM.name(0x18), "DW_FORM_exprloc");
    }

    #[test]
    fn first_alias_wins() {
        assert_eq!(DYNAMIC_TAG.name(32), "DT_PREINIT_ARRAY");
    }

    #[test]
    fn flags_are_order_independent() {
        let forward = LookupTable::from_static(&[(0x1, "R", ""), (0x2, "W", "")]);
        let backward = LookupTable::from_static(&[(0x2, "W", ""), (0x1, "R", "")]);
        let expected: BTreeSet<_> = ["R", "W"].into_iter().collect();
        assert_eq!(forward.resolve_flags(0x3), expected);
        assert_eq!(backward.resolve_flags(0x3), expected);
        assert_eq!(forward.resolve_flags(0x3), forward.resolve_flags(0x3));
    }

    #[test]
    fn unmatched_flag_bits_are_dropped() {
        let names = SECTION_FLAGS.resolve_flags(0x2 | 0x4 | 0x1000_0000);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["SHF_ALLOC", "SHF_EXECINSTR"]);
    }

    #[test]
    fn segment_permissions() {
        let names = SEGMENT_FLAGS.resolve_flags(0x5);
        assert!(names.contains("PF_R"));
        assert!(names.contains("PF_X"));
        assert!(!names.contains("PF_W"));
    }
}
